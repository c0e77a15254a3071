//! In-memory ticket table with optional JSON Lines persistence

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{StoreResult, TicketStore};
use crate::types::{Ticket, TicketDraft, TicketId, TicketUpdate};

#[derive(Debug, Default, Clone)]
struct StoreState {
    tickets: Vec<Ticket>,
    next_id: TicketId,
}

/// Ticket store backed by memory, mirrored to a `.jsonl` file when a path is set
///
/// Each mutation rewrites the whole file through a temp file and rename, so
/// the file on disk is always either the previous or the new table.
pub struct FileTicketStore {
    file_path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl FileTicketStore {
    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            state: Mutex::new(StoreState {
                tickets: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Open (or create on first write) a store persisted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tickets = Self::load_from_file(&path)?;
        let next_id = tickets.iter().map(|t| t.id).max().unwrap_or(0) + 1;

        info!(
            path = %path.display(),
            tickets = tickets.len(),
            "Loaded ticket store"
        );

        Ok(Self {
            file_path: Some(path),
            state: Mutex::new(StoreState { tickets, next_id }),
        })
    }

    /// Number of stored tickets
    pub fn len(&self) -> usize {
        self.state.lock().tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_from_file(path: &Path) -> StoreResult<Vec<Ticket>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        let mut tickets = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<Ticket>(line) {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable ticket record"
                ),
            }
        }

        Ok(tickets)
    }

    /// Write the table to disk; a no-op for in-memory stores
    fn persist(&self, tickets: &[Ticket]) -> StoreResult<()> {
        let Some(ref path) = self.file_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = path.with_extension("jsonl.tmp");
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        for ticket in tickets {
            serde_json::to_writer(&mut writer, ticket)?;
            writer.write_all(b"\n")?;
        }
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), tickets = tickets.len(), "Persisted tickets");
        Ok(())
    }

    /// Run `mutate` on a copy of the table and commit it only if it persists
    fn commit<T>(&self, mutate: impl FnOnce(&mut StoreState) -> T) -> StoreResult<T> {
        let mut state = self.state.lock();
        let mut next = state.clone();
        let result = mutate(&mut next);
        self.persist(&next.tickets)?;
        *state = next;
        Ok(result)
    }
}

impl Default for FileTicketStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl TicketStore for FileTicketStore {
    fn insert(&self, draft: TicketDraft) -> StoreResult<TicketId> {
        self.commit(|state| {
            let id = state.next_id;
            state.next_id += 1;
            state.tickets.push(Ticket::from_draft(id, draft));
            id
        })
    }

    fn get(&self, id: TicketId) -> StoreResult<Option<Ticket>> {
        Ok(self.state.lock().tickets.iter().find(|t| t.id == id).cloned())
    }

    fn list_all(&self) -> StoreResult<Vec<Ticket>> {
        Ok(self.state.lock().tickets.clone())
    }

    fn update(&self, id: TicketId, update: &TicketUpdate) -> StoreResult<usize> {
        if !self.state.lock().tickets.iter().any(|t| t.id == id) {
            return Ok(0);
        }
        self.commit(|state| match state.tickets.iter_mut().find(|t| t.id == id) {
            Some(ticket) => {
                update.apply_to(ticket);
                1
            }
            None => 0,
        })
    }

    fn delete(&self, id: TicketId) -> StoreResult<usize> {
        if !self.state.lock().tickets.iter().any(|t| t.id == id) {
            return Ok(0);
        }
        self.commit(|state| {
            let before = state.tickets.len();
            state.tickets.retain(|t| t.id != id);
            before - state.tickets.len()
        })
    }

    fn max_position_in_line(&self) -> StoreResult<u64> {
        Ok(self
            .state
            .lock()
            .tickets
            .iter()
            .map(|t| t.position_in_line)
            .max()
            .unwrap_or(0))
    }
}
