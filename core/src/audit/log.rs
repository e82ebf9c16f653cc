use crate::audit::event::{finalize_event, AuditEvent, ZERO_HASH_64};
use crate::error::{CoreError, CoreResult};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Hash-chained audit trail. File-backed logs append one JSON line per event;
/// every log also keeps the events appended during this session in memory.
pub struct AuditLog {
    path: Option<PathBuf>,
    last_hash: String,
    session: Vec<AuditEvent>,
}

impl AuditLog {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            last_hash: ZERO_HASH_64.to_string(),
            session: Vec::new(),
        }
    }

    pub fn open_or_create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            return Ok(Self {
                path: Some(path),
                last_hash: ZERO_HASH_64.to_string(),
                session: Vec::new(),
            });
        }

        let mut last_hash = ZERO_HASH_64.to_string();
        for ev in read_events(&path)? {
            last_hash = ev.event_hash;
        }
        Ok(Self {
            path: Some(path),
            last_hash,
            session: Vec::new(),
        })
    }

    pub fn append(&mut self, mut event: AuditEvent) -> CoreResult<AuditEvent> {
        event.prev_event_hash = self.last_hash.clone();
        let event = finalize_event(event)?;
        if let Some(path) = &self.path {
            let line = serde_json::to_string(&event)?;
            let mut f = OpenOptions::new().append(true).open(path)?;
            f.write_all(line.as_bytes())?;
            f.write_all(b"\n")?;
        }
        self.last_hash = event.event_hash.clone();
        self.session.push(event.clone());
        Ok(event)
    }

    pub fn session_events(&self) -> &[AuditEvent] {
        &self.session
    }

    pub fn last_hash(&self) -> &str {
        &self.last_hash
    }
}

pub fn read_events(path: impl AsRef<Path>) -> CoreResult<Vec<AuditEvent>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let ev: AuditEvent = serde_json::from_str(&line).map_err(|e| {
            CoreError::InvalidInput(format!("audit log line is not an event: {}", e))
        })?;
        out.push(ev);
    }
    Ok(out)
}
