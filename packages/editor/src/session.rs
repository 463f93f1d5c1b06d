//! # Edit Session Management
//!
//! One client's view of a shared page.
//!
//! Local edits apply immediately and are kept as pending envelopes until
//! the sequencer acknowledges them. Remote envelopes go through the same
//! `Document::apply` path as local ones, so every invariant holds no
//! matter where an edit came from. Ordering and conflict policy belong to
//! the transport; the session only needs a totally ordered stream.

use crate::{Document, EditorError, Mutation, MutationResult};
use chrono::{DateTime, Utc};
use pagecraft_model::BlockTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The unit a transport carries between clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationEnvelope {
    /// Unique per origin: `{origin}-{sequence}`
    pub id: String,

    /// Session that produced the mutation
    pub origin: String,

    pub mutation: Mutation,

    pub timestamp: DateTime<Utc>,
}

/// Single edit session (one client in multi-user editing)
#[derive(Debug)]
pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    /// Document being edited
    pub document: Document,

    /// Local mutations waiting for acknowledgment, oldest first
    pending: Vec<OperationEnvelope>,

    sequence: u64,
}

impl EditSession {
    /// Open a session on `document`. Blocks created from here on get ids
    /// seeded from the session id, so peers never mint the same id.
    pub fn new(id: impl Into<String>, mut document: Document) -> Self {
        let id = id.into();
        document.adopt_client(&id);
        Self {
            id,
            document,
            pending: Vec::new(),
            sequence: 0,
        }
    }

    /// Run a named operation against the document and record it as pending.
    ///
    /// ```rust,ignore
    /// let envelope = session.edit(|doc| doc.add_block(BlockType::Text));
    /// ```
    pub fn edit<F>(&mut self, operation: F) -> Option<OperationEnvelope>
    where
        F: FnOnce(&mut Document) -> Option<MutationResult>,
    {
        let result = operation(&mut self.document)?;
        Some(self.record(result.mutation))
    }

    /// Apply a mutation locally and record it as pending
    pub fn apply_optimistic(&mut self, mutation: Mutation) -> Result<OperationEnvelope, EditorError> {
        let result = self.document.apply(mutation)?;
        Ok(self.record(result.mutation))
    }

    fn record(&mut self, mutation: Mutation) -> OperationEnvelope {
        self.sequence += 1;
        let envelope = OperationEnvelope {
            id: format!("{}-{}", self.id, self.sequence),
            origin: self.id.clone(),
            mutation,
            timestamp: Utc::now(),
        };
        self.pending.push(envelope.clone());
        envelope
    }

    /// Confirm that a mutation was accepted by the sequencer
    pub fn confirm_mutation(&mut self, envelope_id: &str) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.id != envelope_id);
        before != self.pending.len()
    }

    /// Drop a mutation the sequencer refused. The local tree still shows
    /// it until the next `rebase`.
    pub fn reject_mutation(&mut self, envelope_id: &str) -> bool {
        let removed = self.confirm_mutation(envelope_id);
        if removed {
            warn!(id = envelope_id, "Pending mutation rejected");
        }
        removed
    }

    /// Apply an envelope from the ordered stream.
    ///
    /// Our own envelopes coming back count as acknowledgments. A remote
    /// mutation that no longer applies is skipped.
    pub fn apply_remote(&mut self, envelope: &OperationEnvelope) -> Option<MutationResult> {
        if envelope.origin == self.id {
            self.confirm_mutation(&envelope.id);
            return None;
        }

        match self.document.apply(envelope.mutation.clone()) {
            Ok(result) => {
                debug!(id = %envelope.id, origin = %envelope.origin, "Applied remote mutation");
                Some(result)
            }
            Err(error) => {
                warn!(id = %envelope.id, origin = %envelope.origin, %error, "Skipped remote mutation");
                None
            }
        }
    }

    /// Adopt an authoritative tree and replay pending mutations on top.
    ///
    /// Pending mutations that no longer apply (e.g. their target was
    /// deleted) are dropped. Returns how many are still pending.
    pub fn rebase(&mut self, authoritative: BlockTree) -> Result<usize, EditorError> {
        self.document.reset(authoritative)?;

        let pending = std::mem::take(&mut self.pending);
        for envelope in pending {
            match self.document.apply(envelope.mutation.clone()) {
                Ok(_) => self.pending.push(envelope),
                Err(error) => {
                    warn!(id = %envelope.id, %error, "Dropping pending mutation during rebase");
                }
            }
        }

        Ok(self.pending.len())
    }

    pub fn pending(&self) -> &[OperationEnvelope] {
        &self.pending
    }

    /// Get number of pending mutations
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
