use std::collections::{HashMap, HashSet};

use crate::packet::PID_PAT;
use crate::reader::PayloadReader;
use crate::section::SectionAssembler;
use crate::stream_type::StreamType;

/// Index of a reader in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ReaderId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableKind {
    Pat,
    Pmt,
}

/// What a PID is routed to.
#[derive(Debug)]
pub(crate) enum Slot {
    Table {
        kind: TableKind,
        assembler: SectionAssembler,
    },
    Stream(ReaderId),
}

/// Identity of a track for de-duplication across PMT entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TrackKey {
    Pid(u16),
    StreamType(StreamType),
}

/// PID routing table plus the readers it routes to.
///
/// Bindings are first-write-wins. A reader may be bound under several PIDs.
pub(crate) struct ReaderRegistry {
    readers: Vec<Box<dyn PayloadReader>>,
    slots: HashMap<u16, Slot>,
    track_keys: HashSet<TrackKey>,
    validate_crc: bool,
}

impl ReaderRegistry {
    /// Registry with only the PAT reader bound.
    pub fn new(validate_crc: bool) -> Self {
        let mut registry = Self {
            readers: Vec::new(),
            slots: HashMap::new(),
            track_keys: HashSet::new(),
            validate_crc,
        };
        registry.bind_table(PID_PAT, TableKind::Pat);
        registry
    }

    /// Drop every reader, binding and track key, then bind the PAT again.
    pub fn reset(&mut self) {
        self.readers.clear();
        self.slots.clear();
        self.track_keys.clear();
        self.bind_table(PID_PAT, TableKind::Pat);
    }

    pub fn bind_table(&mut self, pid: u16, kind: TableKind) -> bool {
        if self.slots.contains_key(&pid) {
            return false;
        }
        let assembler = SectionAssembler::new(self.validate_crc);
        self.slots.insert(pid, Slot::Table { kind, assembler });
        true
    }

    /// Take ownership of a reader without binding it to a PID.
    pub fn add_reader(&mut self, reader: Box<dyn PayloadReader>) -> ReaderId {
        self.readers.push(reader);
        ReaderId(self.readers.len() - 1)
    }

    pub fn bind_stream(&mut self, pid: u16, id: ReaderId) -> bool {
        if self.slots.contains_key(&pid) {
            return false;
        }
        self.slots.insert(pid, Slot::Stream(id));
        true
    }

    pub fn unbind(&mut self, pid: u16) -> bool {
        self.slots.remove(&pid).is_some()
    }

    #[cfg(test)]
    pub fn is_bound(&self, pid: u16) -> bool {
        self.slots.contains_key(&pid)
    }

    pub fn slot_mut(&mut self, pid: u16) -> Option<&mut Slot> {
        self.slots.get_mut(&pid)
    }

    pub fn reader_mut(&mut self, id: ReaderId) -> Option<&mut (dyn PayloadReader + 'static)> {
        self.readers.get_mut(id.0).map(|reader| &mut **reader)
    }

    /// Drop partial state of whatever is bound to `pid`.
    pub fn reset_pid(&mut self, pid: u16) {
        match self.slots.get_mut(&pid) {
            Some(Slot::Table { assembler, .. }) => assembler.reset(),
            Some(Slot::Stream(id)) => {
                if let Some(reader) = self.readers.get_mut(id.0) {
                    reader.seek();
                }
            }
            None => {}
        }
    }

    #[cfg(test)]
    pub fn has_track_key(&self, key: TrackKey) -> bool {
        self.track_keys.contains(&key)
    }

    /// Returns false if the key was already recorded.
    pub fn record_track_key(&mut self, key: TrackKey) -> bool {
        self.track_keys.insert(key)
    }

    #[cfg(test)]
    pub fn table_kind(&self, pid: u16) -> Option<TableKind> {
        match self.slots.get(&pid) {
            Some(Slot::Table { kind, .. }) => Some(*kind),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn stream_reader(&self, pid: u16) -> Option<ReaderId> {
        match self.slots.get(&pid) {
            Some(Slot::Stream(id)) => Some(*id),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn reader_count(&self) -> usize {
        self.readers.len()
    }
}
