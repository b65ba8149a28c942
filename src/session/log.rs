// ABOUTME: XML action log — appends one <action user=".." command=".."/> per shell command.
// ABOUTME: The whole document is re-read, extended under its existing root, and atomically rewritten.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, warn};

use crate::config::{CorruptLogPolicy, LogConfig};
use crate::error::{Result, ShellError};

/// Root element name for newly created logs.
pub const ROOT_ELEMENT: &str = "log";
/// Element name of a single recorded action.
pub const ACTION_ELEMENT: &str = "action";

/// A single recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub user: String,
    pub command: String,
    /// RFC 3339 timestamp, present only when timestamps are enabled.
    pub time: Option<String>,
}

impl ActionRecord {
    fn to_element(&self) -> BytesStart<'_> {
        let mut element = BytesStart::new(ACTION_ELEMENT);
        element.push_attribute(("user", self.user.as_str()));
        element.push_attribute(("command", self.command.as_str()));
        if let Some(time) = &self.time {
            element.push_attribute(("time", time.as_str()));
        }
        element
    }

    fn from_element(element: &BytesStart<'_>, path: &Path) -> Result<Self> {
        let mut record = ActionRecord {
            user: String::new(),
            command: String::new(),
            time: None,
        };
        for attr in element.attributes() {
            let attr = attr.map_err(|e| corrupt(path, e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| corrupt(path, e.to_string()))?
                .into_owned();
            match attr.key.as_ref() {
                b"user" => record.user = value,
                b"command" => record.command = value,
                b"time" => record.time = Some(value),
                _ => {}
            }
        }
        Ok(record)
    }
}

/// Append-only action log backed by an XML file.
///
/// No file handle is kept between appends: every call reads the current
/// document, adds one record as the last child of the root, and replaces
/// the file via a temporary sibling and rename.
#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
    timestamps: bool,
    on_corrupt: CorruptLogPolicy,
}

impl ActionLog {
    /// Create a log at `path` with default options (no timestamps, fail on corruption).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_config(path, &LogConfig::default())
    }

    pub fn from_config(path: impl Into<PathBuf>, config: &LogConfig) -> Self {
        Self {
            path: path.into(),
            timestamps: config.timestamps,
            on_corrupt: config.on_corrupt,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record for `user` running `command`.
    pub fn append(&self, user: &str, command: &str) -> Result<()> {
        let record = ActionRecord {
            user: user.to_string(),
            command: command.to_string(),
            time: self.timestamps.then(|| Utc::now().to_rfc3339()),
        };

        let existing = match self.read_existing() {
            Err(err @ ShellError::CorruptLog { .. }) => return self.recover(err, &record),
            other => other?,
        };
        let document = match render_with_record(existing.as_deref(), &record, &self.path) {
            Err(err @ ShellError::CorruptLog { .. }) => return self.recover(err, &record),
            other => other?,
        };
        self.write_atomic(&document)?;
        debug!(user, command, path = %self.path.display(), "Appended action");
        Ok(())
    }

    /// Read every `<action>` directly under the root, in document order.
    /// A missing log file has no records.
    pub fn records(&self) -> Result<Vec<ActionRecord>> {
        let Some(content) = self.read_existing()? else {
            return Ok(Vec::new());
        };

        let mut reader = Reader::from_str(&content);
        reader.config_mut().trim_text(true);
        let mut records = Vec::new();
        let mut depth = 0usize;
        loop {
            let event = reader
                .read_event()
                .map_err(|e| corrupt(&self.path, e.to_string()))?;
            match event {
                Event::Eof => break,
                Event::Start(element) => {
                    if depth == 1 && element.name().as_ref() == ACTION_ELEMENT.as_bytes() {
                        records.push(ActionRecord::from_element(&element, &self.path)?);
                    }
                    depth += 1;
                }
                Event::Empty(element) => {
                    if depth == 1 && element.name().as_ref() == ACTION_ELEMENT.as_bytes() {
                        records.push(ActionRecord::from_element(&element, &self.path)?);
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        Ok(records)
    }

    /// Apply the corrupt-log policy to a failed append.
    fn recover(&self, err: ShellError, record: &ActionRecord) -> Result<()> {
        if self.on_corrupt == CorruptLogPolicy::Fail {
            return Err(err);
        }
        let aside = self.corrupt_backup_path();
        fs::rename(&self.path, &aside).map_err(|source| ShellError::LogIo {
            path: self.path.clone(),
            source,
        })?;
        warn!(
            error = %err,
            moved_to = %aside.display(),
            "Starting a fresh action log"
        );
        let document = render_with_record(None, record, &self.path)?;
        self.write_atomic(&document)
    }

    /// `<log>.corrupt`, or a timestamped name when that backup already exists.
    fn corrupt_backup_path(&self) -> PathBuf {
        let aside = sibling_path(&self.path, ".corrupt");
        if !aside.exists() {
            return aside;
        }
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.9fZ");
        sibling_path(&self.path, &format!(".corrupt-{stamp}"))
    }

    fn read_existing(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                Err(corrupt(&self.path, "file is not valid UTF-8".to_string()))
            }
            Err(source) => Err(ShellError::LogIo {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_atomic(&self, document: &[u8]) -> Result<()> {
        let io_err = |source| ShellError::LogIo {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp_path = sibling_path(&self.path, ".tmp");
        fs::write(&tmp_path, document).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

/// Produce the full log document with `record` appended.
///
/// With no existing content a fresh `<log>` document is created. Otherwise
/// the existing events are replayed unchanged and the record is inserted
/// just before the root element closes.
pub fn render_with_record(
    existing: Option<&str>,
    record: &ActionRecord,
    path: &Path,
) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    let Some(existing) = existing else {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new(ROOT_ELEMENT)))?;
        writer.write_event(Event::Empty(record.to_element()))?;
        writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;
        return Ok(finish(writer));
    };

    let mut reader = Reader::from_str(existing);
    reader.config_mut().trim_text(true);
    let mut depth = 0usize;
    let mut root_seen = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| corrupt(path, e.to_string()))?;
        match event {
            Event::Eof => break,
            Event::Start(element) => {
                if depth == 0 {
                    if root_seen {
                        return Err(corrupt(path, "more than one root element".to_string()));
                    }
                    root_seen = true;
                }
                depth += 1;
                writer.write_event(Event::Start(element))?;
            }
            Event::End(element) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| corrupt(path, "unmatched closing tag".to_string()))?;
                if depth == 0 {
                    writer.write_event(Event::Empty(record.to_element()))?;
                }
                writer.write_event(Event::End(element))?;
            }
            Event::Empty(element) if depth == 0 => {
                if root_seen {
                    return Err(corrupt(path, "more than one root element".to_string()));
                }
                root_seen = true;
                let end = element.to_end().into_owned();
                writer.write_event(Event::Start(element))?;
                writer.write_event(Event::Empty(record.to_element()))?;
                writer.write_event(Event::End(end))?;
            }
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(corrupt(path, "text outside the root element".to_string()));
            }
            other => writer.write_event(other)?,
        }
    }

    if !root_seen {
        return Err(corrupt(path, "no root element".to_string()));
    }
    if depth > 0 {
        return Err(corrupt(path, "document ends inside the root element".to_string()));
    }
    Ok(finish(writer))
}

fn finish(writer: Writer<Vec<u8>>) -> Vec<u8> {
    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    bytes
}

fn corrupt(path: &Path, reason: String) -> ShellError {
    ShellError::CorruptLog {
        path: path.to_path_buf(),
        reason,
    }
}

/// `log.xml` + `.tmp` -> `log.xml.tmp`, regardless of the original extension.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
