//! Section and record framing
//!
//! Groups the flat tag stream into sections (`0 SECTION` / `2 name` ...
//! `0 ENDSEC`) and, inside a section, into records: a `0 <name>` tag and
//! every tag up to the next `0`. Records that own a vertex or attribute
//! run (POLYLINE, INSERT with `66 1`) collect the nested `VERTEX` /
//! `ATTRIB` records as children, terminated by `SEQEND`.

use super::lexer::{Tag, TagStream};
use super::ParseMode;
use crate::error::{DxfError, Position, Result};
use crate::notification::{Notification, NotificationCollection, NotificationType};

/// A `0`-delimited record with its nested sub-records
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Name after group code 0
    pub name: String,
    /// Position of the `0` tag
    pub position: Position,
    /// Tags after the `0` tag
    pub tags: Vec<Tag>,
    /// Nested VERTEX / ATTRIB records
    pub children: Vec<Record>,
    /// Terminating SEQEND of a nested run
    pub seqend: Option<Box<Record>>,
}

impl Record {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Record {
            name: name.into(),
            position,
            tags: Vec::new(),
            children: Vec::new(),
            seqend: None,
        }
    }

    /// First value of `code`, as text
    pub fn find_str(&self, code: i32) -> Option<&str> {
        self.tags.iter().find(|t| t.code == code).and_then(|t| t.value.as_str())
    }

    /// First value of `code`, as an integer
    pub fn find_i16(&self, code: i32) -> Option<i16> {
        self.tags.iter().find(|t| t.code == code).and_then(|t| t.value.as_i16())
    }

    /// Whether a nested run follows this record
    fn owns_run(&self) -> bool {
        match self.name.as_str() {
            "POLYLINE" => true,
            "INSERT" => self.find_i16(66).unwrap_or(0) != 0,
            _ => false,
        }
    }

    fn is_child(&self, name: &str) -> bool {
        match self.name.as_str() {
            "POLYLINE" => name == "VERTEX",
            "INSERT" => name == "ATTRIB",
            _ => false,
        }
    }
}

/// Where the framer is in the file
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Start,
    InSection(String),
    Eof,
}

/// Section framing state machine over a [`TagStream`]
pub struct Framer {
    stream: TagStream,
    mode: ParseMode,
    state: State,
    /// Record read past the end of a nested run
    pending: Option<Record>,
    /// Problems recovered from in lenient mode
    pub notifications: NotificationCollection,
}

impl Framer {
    pub fn new(stream: TagStream, mode: ParseMode) -> Self {
        Framer {
            stream,
            mode,
            state: State::Start,
            pending: None,
            notifications: NotificationCollection::new(),
        }
    }

    pub fn stream_mut(&mut self) -> &mut TagStream {
        &mut self.stream
    }

    fn section_name(&self) -> &str {
        match &self.state {
            State::InSection(name) => name,
            State::Start => "<none>",
            State::Eof => "<eof>",
        }
    }

    fn unexpected(&self, found: impl Into<String>, position: Position) -> DxfError {
        DxfError::UnexpectedSection {
            section: self.section_name().to_string(),
            found: found.into(),
            position,
        }
    }

    /// Advance to the next section and return its name, or `None` at `0 EOF`
    /// or the end of the stream
    pub fn next_section(&mut self) -> Result<Option<String>> {
        if let State::InSection(name) = &self.state {
            return Err(self.unexpected(
                format!("SECTION while {} is still open", name),
                self.stream.last_position(),
            ));
        }
        if self.state == State::Eof {
            return Ok(None);
        }
        let tag = match self.stream.read()? {
            Some(tag) => tag,
            None => {
                self.state = State::Eof;
                return Ok(None);
            }
        };
        if tag.is_start("EOF") {
            self.state = State::Eof;
            return Ok(None);
        }
        if !tag.is_start("SECTION") {
            return Err(self.unexpected(describe(&tag), tag.position));
        }
        let name_tag = self.stream.read()?.ok_or_else(|| DxfError::MalformedTag {
            position: tag.position,
            message: "SECTION without a name".to_string(),
        })?;
        if name_tag.code != 2 {
            return Err(self.unexpected(describe(&name_tag), name_tag.position));
        }
        let name = name_tag.as_str().to_string();
        tracing::debug!(section = %name, position = %tag.position, "section start");
        self.state = State::InSection(name.clone());
        Ok(Some(name))
    }

    /// Next tag of the current section, `None` at `0 ENDSEC`
    pub fn next_tag(&mut self) -> Result<Option<Tag>> {
        if !matches!(self.state, State::InSection(_)) {
            return Ok(None);
        }
        let tag = match self.stream.read()? {
            Some(tag) => tag,
            None => {
                return Err(self.unexpected("end of stream", self.stream.last_position()));
            }
        };
        if tag.code == 0 {
            match tag.as_str() {
                "ENDSEC" => {
                    tracing::debug!(section = self.section_name(), "section end");
                    self.state = State::Start;
                    return Ok(None);
                }
                "SECTION" | "EOF" => return Err(self.unexpected(describe(&tag), tag.position)),
                _ => {}
            }
        }
        Ok(Some(tag))
    }

    /// Every remaining tag of the current section
    pub fn section_tags(&mut self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        while let Some(tag) = self.next_tag()? {
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Skip to the end of the current section
    pub fn skip_section(&mut self) -> Result<()> {
        while self.next_tag()?.is_some() {}
        Ok(())
    }

    /// Read one flat record, `None` at `0 ENDSEC`.
    ///
    /// End of stream inside a record is `UnterminatedEntity`.
    fn read_flat(&mut self) -> Result<Option<Record>> {
        let start = match self.next_tag()? {
            Some(tag) => tag,
            None => return Ok(None),
        };
        if start.code != 0 {
            return Err(self.unexpected(describe(&start), start.position));
        }
        let mut record = Record::new(start.as_str(), start.position);
        loop {
            let next_code = self.stream.peek()?.map(|t| t.code);
            match next_code {
                Some(0) => break,
                Some(_) => {
                    if let Some(tag) = self.stream.read()? {
                        record.tags.push(tag);
                    }
                }
                None => {
                    return Err(DxfError::UnterminatedEntity {
                        entity: record.name,
                        position: record.position,
                    })
                }
            }
        }
        Ok(Some(record))
    }

    /// Flat record, or the record held back by the last nested run
    fn read_flat_or_recover(&mut self) -> Result<Option<Record>> {
        if let Some(record) = self.pending.take() {
            return Ok(Some(record));
        }
        match self.read_flat() {
            Err(DxfError::UnterminatedEntity { entity, position }) if self.mode == ParseMode::Lenient => {
                self.notifications.push(
                    Notification::new(
                        NotificationType::Error,
                        format!("stream ends inside {}; the partial record was dropped", entity),
                    )
                    .at(position),
                );
                self.state = State::Eof;
                Ok(None)
            }
            other => other,
        }
    }

    fn missing_seqend(&mut self, record: &Record) -> Result<()> {
        if self.mode == ParseMode::Strict {
            return Err(DxfError::UnterminatedEntity {
                entity: record.name.clone(),
                position: record.position,
            });
        }
        self.notifications.push(
            Notification::new(
                NotificationType::Warning,
                format!("{} run has no SEQEND", record.name),
            )
            .at(record.position),
        );
        Ok(())
    }

    /// Read the next record of the current section with its nested run,
    /// `None` at `0 ENDSEC`.
    ///
    /// In lenient mode a record cut off by the end of the stream is dropped
    /// with a warning and reading stops; a nested run missing its SEQEND is
    /// closed at the next record.
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let mut record = match self.read_flat_or_recover()? {
            Some(record) => record,
            None => return Ok(None),
        };
        if !record.owns_run() {
            return Ok(Some(record));
        }
        loop {
            let next = match self.read_flat_or_recover()? {
                Some(next) => next,
                None => {
                    if self.state != State::Eof {
                        self.missing_seqend(&record)?;
                    }
                    return Ok(Some(record));
                }
            };
            if next.name == "SEQEND" {
                record.seqend = Some(Box::new(next));
                return Ok(Some(record));
            }
            if record.is_child(&next.name) {
                record.children.push(next);
                continue;
            }
            self.missing_seqend(&record)?;
            self.pending = Some(next);
            return Ok(Some(record));
        }
    }

    /// Whether reading stopped early at a cut-off record
    pub fn is_eof(&self) -> bool {
        self.state == State::Eof
    }
}

fn describe(tag: &Tag) -> String {
    format!("({}, {})", tag.code, tag.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::lexer::LexerOptions;
    use std::io::Cursor;

    fn framer(text: &str, mode: ParseMode) -> Framer {
        let stream = TagStream::open(Cursor::new(text.as_bytes().to_vec()), LexerOptions::default()).unwrap();
        Framer::new(stream, mode)
    }

    fn dxf(lines: &[&str]) -> String {
        let mut s = lines.join("\n");
        s.push('\n');
        s
    }

    #[test]
    fn test_sections_and_records() {
        let text = dxf(&[
            "0", "SECTION", "2", "ENTITIES",
            "0", "LINE", "8", "0", "10", "1.0",
            "0", "CIRCLE", "40", "2.0",
            "0", "ENDSEC",
            "0", "EOF",
        ]);
        let mut f = framer(&text, ParseMode::Strict);
        assert_eq!(f.next_section().unwrap().as_deref(), Some("ENTITIES"));
        let line = f.next_record().unwrap().unwrap();
        assert_eq!(line.name, "LINE");
        assert_eq!(line.tags.len(), 2);
        assert_eq!(line.position.line, Some(5));
        assert_eq!(f.next_record().unwrap().unwrap().name, "CIRCLE");
        assert!(f.next_record().unwrap().is_none());
        assert!(f.next_section().unwrap().is_none());
    }

    #[test]
    fn test_polyline_collects_vertices() {
        let text = dxf(&[
            "0", "SECTION", "2", "ENTITIES",
            "0", "POLYLINE", "66", "1", "70", "8",
            "0", "VERTEX", "10", "0.0",
            "0", "VERTEX", "10", "1.0",
            "0", "SEQEND",
            "0", "LINE",
            "0", "ENDSEC",
        ]);
        let mut f = framer(&text, ParseMode::Strict);
        f.next_section().unwrap();
        let polyline = f.next_record().unwrap().unwrap();
        assert_eq!(polyline.children.len(), 2);
        assert!(polyline.seqend.is_some());
        assert_eq!(f.next_record().unwrap().unwrap().name, "LINE");
        assert!(f.next_record().unwrap().is_none());
    }

    #[test]
    fn test_insert_without_attributes_has_no_run() {
        let text = dxf(&[
            "0", "SECTION", "2", "ENTITIES",
            "0", "INSERT", "2", "DOOR",
            "0", "LINE",
            "0", "ENDSEC",
        ]);
        let mut f = framer(&text, ParseMode::Strict);
        f.next_section().unwrap();
        assert!(f.next_record().unwrap().unwrap().children.is_empty());
        assert_eq!(f.next_record().unwrap().unwrap().name, "LINE");
    }

    #[test]
    fn test_missing_seqend_by_mode() {
        let lines = [
            "0", "SECTION", "2", "ENTITIES",
            "0", "POLYLINE", "70", "8",
            "0", "VERTEX", "10", "0.0",
            "0", "LINE",
            "0", "ENDSEC",
        ];
        let mut strict = framer(&dxf(&lines), ParseMode::Strict);
        strict.next_section().unwrap();
        assert!(matches!(
            strict.next_record().unwrap_err(),
            DxfError::UnterminatedEntity { ref entity, .. } if entity == "POLYLINE"
        ));

        let mut lenient = framer(&dxf(&lines), ParseMode::Lenient);
        lenient.next_section().unwrap();
        let polyline = lenient.next_record().unwrap().unwrap();
        assert_eq!(polyline.children.len(), 1);
        assert_eq!(lenient.next_record().unwrap().unwrap().name, "LINE");
        assert!(lenient.notifications.has_type(NotificationType::Warning));
    }

    #[test]
    fn test_unterminated_entity_by_mode() {
        let lines = ["0", "SECTION", "2", "ENTITIES", "0", "LINE", "8", "0", "10", "1.0"];
        let mut strict = framer(&dxf(&lines), ParseMode::Strict);
        strict.next_section().unwrap();
        assert!(matches!(
            strict.next_record().unwrap_err(),
            DxfError::UnterminatedEntity { ref entity, .. } if entity == "LINE"
        ));

        let mut lenient = framer(&dxf(&lines), ParseMode::Lenient);
        lenient.next_section().unwrap();
        assert!(lenient.next_record().unwrap().is_none());
        assert!(lenient.is_eof());
        assert!(lenient.notifications.has_type(NotificationType::Error));
        assert!(lenient.next_section().unwrap().is_none());
    }

    #[test]
    fn test_nested_section_is_rejected() {
        let text = dxf(&["0", "SECTION", "2", "HEADER", "0", "SECTION", "2", "TABLES"]);
        let mut f = framer(&text, ParseMode::Lenient);
        f.next_section().unwrap();
        assert!(matches!(f.next_tag().unwrap_err(), DxfError::UnexpectedSection { .. }));
    }

    #[test]
    fn test_tag_outside_section_is_rejected() {
        let text = dxf(&["0", "ENDSEC", "0", "EOF"]);
        let mut f = framer(&text, ParseMode::Lenient);
        assert!(matches!(f.next_section().unwrap_err(), DxfError::UnexpectedSection { .. }));
    }
}
