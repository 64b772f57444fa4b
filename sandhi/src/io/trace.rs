//! Recorded input traces.
//!
//! A trace is a JSON-lines file, one [`TraceEvent`] per line, tagged by
//! `type`. Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! # laptop opened to 90°, then folded back
//! {"type":"lid","t_ms":0,"open":true}
//! {"type":"accelerometer","t_ms":100,"base":[0,-9.8,0],"lid":[0,0,9.8]}
//! {"type":"accelerometer","t_ms":200,"base":[0,-9.8,0],"lid":[0,0,-9.8]}
//! {"type":"mouse","t_ms":300,"present":true}
//! ```

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::core::math::Vector3;
use crate::core::types::{AccelerometerReading, AccelerometerUpdate, LidState, TabletSwitch};
use crate::error::{Error, Result};

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// One recorded input, stamped with milliseconds since the trace start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Accelerometer delivery; either source may be absent.
    Accelerometer {
        t_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<[f32; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lid: Option<[f32; 3]>,
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        base_stable: bool,
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        lid_stable: bool,
    },
    /// Lid switch.
    Lid { t_ms: u64, open: bool },
    /// Hardware tablet-mode switch.
    TabletSwitch { t_ms: u64, on: bool },
    /// Display configuration change.
    Display {
        t_ms: u64,
        internal_present: bool,
        internal_active: bool,
    },
    /// External mouse presence.
    Mouse { t_ms: u64, present: bool },
    /// Suspend at `t_ms`, resuming `duration_ms` later.
    Suspend { t_ms: u64, duration_ms: u64 },
}

impl TraceEvent {
    pub fn t_ms(&self) -> u64 {
        match self {
            TraceEvent::Accelerometer { t_ms, .. }
            | TraceEvent::Lid { t_ms, .. }
            | TraceEvent::TabletSwitch { t_ms, .. }
            | TraceEvent::Display { t_ms, .. }
            | TraceEvent::Mouse { t_ms, .. }
            | TraceEvent::Suspend { t_ms, .. } => *t_ms,
        }
    }

    /// Paired accelerometer event with both readings stable.
    pub fn accelerometer(t_ms: u64, update: &AccelerometerUpdate) -> Self {
        let vector = |r: &AccelerometerReading| [r.vector.x, r.vector.y, r.vector.z];
        TraceEvent::Accelerometer {
            t_ms,
            base: update.base.as_ref().map(vector),
            lid: update.lid.as_ref().map(vector),
            base_stable: update.base.map(|r| r.stable).unwrap_or(true),
            lid_stable: update.lid.map(|r| r.stable).unwrap_or(true),
        }
    }

    /// The accelerometer update this event carries, if any.
    pub fn to_update(&self) -> Option<AccelerometerUpdate> {
        match self {
            TraceEvent::Accelerometer {
                base,
                lid,
                base_stable,
                lid_stable,
                ..
            } => Some(AccelerometerUpdate {
                base: base.map(|v| AccelerometerReading::new(Vector3::from(v), *base_stable)),
                lid: lid.map(|v| AccelerometerReading::new(Vector3::from(v), *lid_stable)),
            }),
            _ => None,
        }
    }

    pub fn lid_state(open: bool) -> LidState {
        if open {
            LidState::Open
        } else {
            LidState::Closed
        }
    }

    pub fn tablet_switch(on: bool) -> TabletSwitch {
        TabletSwitch::from(on)
    }
}

/// Parse one trace line. Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<TraceEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| Error::Trace {
            line: line_number,
            message: e.to_string(),
        })
}

/// Streaming trace parser over any buffered reader.
pub struct TraceReader<R> {
    reader: R,
    line_number: usize,
    buffer: String,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.reader.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    match parse_line(&self.buffer, self.line_number) {
                        Ok(Some(event)) => return Some(Ok(event)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

/// Read a whole trace, stopping at the first malformed line.
pub fn read_trace<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>> {
    TraceReader::new(reader).collect()
}

/// Read a whole trace file.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEvent>> {
    TraceReader::open(path)?.collect()
}

/// Write events as JSON lines.
pub fn write_trace<W: Write>(mut writer: W, events: &[TraceEvent]) -> Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_accelerometer_defaults() {
        let event = parse_line(
            r#"{"type":"accelerometer","t_ms":5,"base":[0,-9.8,0],"lid":[0,0,9.8]}"#,
            1,
        )
        .unwrap()
        .unwrap();

        assert_eq!(event.t_ms(), 5);
        let update = event.to_update().unwrap();
        assert!(update.has_both());
        assert!(update.base.unwrap().stable);
        assert!(update.lid.unwrap().stable);
        assert_eq!(update.lid.unwrap().vector, Vector3::new(0.0, 0.0, 9.8));
    }

    #[test]
    fn test_parse_lid_only_and_unstable() {
        let event = parse_line(
            r#"{"type":"accelerometer","t_ms":0,"lid":[0,0,9.8],"lid_stable":false}"#,
            1,
        )
        .unwrap()
        .unwrap();
        let update = event.to_update().unwrap();
        assert!(update.base.is_none());
        assert!(!update.lid.unwrap().stable);
    }

    #[test]
    fn test_parse_switch_events() {
        let lines = [
            r#"{"type":"lid","t_ms":1,"open":false}"#,
            r#"{"type":"tablet_switch","t_ms":2,"on":true}"#,
            r#"{"type":"display","t_ms":3,"internal_present":true,"internal_active":false}"#,
            r#"{"type":"mouse","t_ms":4,"present":true}"#,
            r#"{"type":"suspend","t_ms":5,"duration_ms":60000}"#,
        ];
        let events: Vec<TraceEvent> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| parse_line(l, i + 1).unwrap().unwrap())
            .collect();

        assert_eq!(events[0], TraceEvent::Lid { t_ms: 1, open: false });
        assert_eq!(events[1], TraceEvent::TabletSwitch { t_ms: 2, on: true });
        assert!(events[2].to_update().is_none());
        assert_eq!(
            events[4],
            TraceEvent::Suspend {
                t_ms: 5,
                duration_ms: 60000
            }
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = "# header\n\n{\"type\":\"mouse\",\"t_ms\":0,\"present\":false}\n   \n";
        let events = read_trace(Cursor::new(text)).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let text = "# header\n{\"type\":\"lid\",\"t_ms\":0,\"open\":true}\n{\"type\":\"lid\"}\n";
        let err = read_trace(Cursor::new(text)).unwrap_err();
        match err {
            Error::Trace { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(parse_line(r#"{"type":"gyro","t_ms":0}"#, 1).is_err());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.jsonl");
        let events = vec![
            TraceEvent::accelerometer(0, &AccelerometerUpdate::for_lid_angle(90.0)),
            TraceEvent::Lid { t_ms: 10, open: false },
        ];

        write_trace(File::create(&path).unwrap(), &events).unwrap();
        let loaded = load_trace(&path).unwrap();

        assert_eq!(loaded, events);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("base_stable"));
    }
}
