//! Diagnostics collected while reading or writing.
//!
//! In lenient mode every recovered problem (skipped entity, substituted
//! reference, unknown group code) is recorded here and logged through
//! `tracing`. After a read the caller can inspect
//! [`CadDocument::notifications`](crate::CadDocument::notifications).

use std::fmt;

use crate::error::{DxfError, Position};
use crate::types::Handle;

/// Severity / category of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationType {
    /// Content kept verbatim because it has no typed model
    NotImplemented,
    /// Non-fatal oddity, the data was kept
    Warning,
    /// Error that was recovered from by dropping or substituting data
    Error,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotImplemented => write!(f, "NotImplemented"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
        }
    }
}

/// A single diagnostic
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub notification_type: NotificationType,
    pub message: String,
    /// Where in the input the problem was found, when known
    pub position: Option<Position>,
    /// Object the problem belongs to, when known
    pub handle: Option<Handle>,
}

impl Notification {
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        Self {
            notification_type,
            message: message.into(),
            position: None,
            handle: None,
        }
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn on(mut self, handle: Handle) -> Self {
        if handle.is_valid() {
            self.handle = Some(handle);
        }
        self
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.notification_type, self.message)?;
        if let Some(handle) = self.handle {
            write!(f, " (handle {})", handle)?;
        }
        if let Some(position) = self.position {
            write!(f, " at {}", position)?;
        }
        Ok(())
    }
}

/// Ordered collection of notifications
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationCollection {
    items: Vec<Notification>,
}

impl NotificationCollection {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Record a notification and emit the matching `tracing` event
    pub fn push(&mut self, notification: Notification) {
        match notification.notification_type {
            NotificationType::Error | NotificationType::Warning => tracing::warn!(
                kind = %notification.notification_type,
                handle = ?notification.handle,
                position = ?notification.position,
                "{}",
                notification.message
            ),
            NotificationType::NotImplemented => {
                tracing::debug!(message = %notification.message, "kept verbatim")
            }
        }
        self.items.push(notification);
    }

    pub fn notify(&mut self, notification_type: NotificationType, message: impl Into<String>) {
        self.push(Notification::new(notification_type, message));
    }

    /// Record a recovered error
    pub fn recovered(&mut self, error: &DxfError, handle: Handle) {
        let mut n = Notification::new(NotificationType::Error, error.to_string()).on(handle);
        n.position = error.position();
        self.push(n);
    }

    /// Move all notifications of `other` to the end of this collection
    pub fn append(&mut self, other: &mut NotificationCollection) {
        self.items.append(&mut other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Notification> {
        self.items.iter()
    }

    pub fn of_type(&self, nt: NotificationType) -> Vec<&Notification> {
        self.items.iter().filter(|n| n.notification_type == nt).collect()
    }

    pub fn has_type(&self, nt: NotificationType) -> bool {
        self.items.iter().any(|n| n.notification_type == nt)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a NotificationCollection {
    type Item = &'a Notification;
    type IntoIter = std::slice::Iter<'a, Notification>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_basics() {
        let mut c = NotificationCollection::new();
        assert!(c.is_empty());

        c.notify(NotificationType::Warning, "w1");
        c.notify(NotificationType::Error, "e1");
        c.notify(NotificationType::Warning, "w2");

        assert_eq!(c.len(), 3);
        assert_eq!(c.of_type(NotificationType::Warning).len(), 2);
        assert!(c.has_type(NotificationType::Error));
        assert!(!c.has_type(NotificationType::NotImplemented));
    }

    #[test]
    fn test_display_with_context() {
        let n = Notification::new(NotificationType::Error, "dropped LINE")
            .on(Handle::new(0x2A))
            .at(Position::text(10, 3));
        assert_eq!(n.to_string(), "[Error] dropped LINE (handle 2A) at line 3 (byte 10)");
    }

    #[test]
    fn test_recovered_keeps_position() {
        let mut c = NotificationCollection::new();
        let err = DxfError::UnterminatedEntity {
            entity: "LINE".into(),
            position: Position::binary(99),
        };
        c.recovered(&err, Handle::NULL);
        let n = c.iter().next().unwrap();
        assert_eq!(n.position, Some(Position::binary(99)));
        assert_eq!(n.handle, None);
    }
}
