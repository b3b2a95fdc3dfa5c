//! Evidence file staging and preview handles
//!
//! Files chosen by the claimant are checked against the constraints of the
//! slot they are dropped into and get a local preview handle. Nothing is
//! uploaded here; the submission collaborator receives file references.
//!
//! # Slot constraints
//!
//! | slot | allowed types |
//! |------|---------------|
//! | account screenshot | image/jpeg, image/png |
//! | email screenshot | image/jpeg, image/png, application/pdf |
//! | bank statement | image/jpeg, image/png, application/pdf |
//! | additional file | image/jpeg, image/png, video/mp4, application/pdf |
//!
//! Every slot shares the configured size cap (5 MiB by default).
//!
//! # Preview lifecycle
//!
//! Each preview handle is owned by exactly one slot. Staging into an
//! occupied slot revokes the old handle before the new one is created;
//! releasing a slot revokes its handle; dropping the manager revokes all.
//! Video thumbnails are rendered out of band and matched back by ticket.
//! A thumbnail whose ticket was superseded is dropped on arrival.
//!
//! A file that the draft still references can be shelved instead of
//! released: it leaves its slot but keeps its preview until
//! [`EvidenceFileManager::retain_files`] either restores it to the empty
//! slot or revokes it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{EntryId, FileId, PortError, PreviewId, TicketId};

use crate::error::FileError;
use crate::ports::{Thumbnail, ThumbnailPort};
use crate::value::FileRef;

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_MP4: &str = "video/mp4";

/// The kinds of upload targets in the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    AccountScreenshot,
    EmailScreenshot,
    BankStatement,
    AdditionalFile,
}

impl SlotKind {
    /// MIME types the slot accepts
    pub fn allowed_types(&self) -> &'static [&'static str] {
        match self {
            SlotKind::AccountScreenshot => &[MIME_JPEG, MIME_PNG],
            SlotKind::EmailScreenshot | SlotKind::BankStatement => &[MIME_JPEG, MIME_PNG, MIME_PDF],
            SlotKind::AdditionalFile => &[MIME_JPEG, MIME_PNG, MIME_MP4, MIME_PDF],
        }
    }

    /// Field name of a single-file slot; additional files live in an array
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            SlotKind::AccountScreenshot => Some("accountScreenshot"),
            SlotKind::EmailScreenshot => Some("emailScreenshot"),
            SlotKind::BankStatement => Some("bankStatement"),
            SlotKind::AdditionalFile => None,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SlotKind::AccountScreenshot => "account screenshot",
            SlotKind::EmailScreenshot => "email screenshot",
            SlotKind::BankStatement => "bank statement",
            SlotKind::AdditionalFile => "additional file",
        };
        f.write_str(label)
    }
}

/// Addresses one staged file: a named slot or an additional-files entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKey {
    Named(SlotKind),
    Entry(EntryId),
}

impl SlotKey {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotKey::Named(kind) => *kind,
            SlotKey::Entry(_) => SlotKind::AdditionalFile,
        }
    }
}

/// A file offered by the user, before any checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

/// How a staged file is previewed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewKind {
    Image,
    Video,
    Pdf,
}

impl PreviewKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            MIME_JPEG | MIME_PNG => Some(PreviewKind::Image),
            MIME_MP4 => Some(PreviewKind::Video),
            MIME_PDF => Some(PreviewKind::Pdf),
            _ => None,
        }
    }
}

/// Thumbnail status of a preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState {
    /// Images and PDFs preview directly
    NotApplicable,
    /// Video thumbnail requested under this ticket
    Pending(TicketId),
    /// Rendered thumbnail handle
    Ready { uri: String },
    /// Rendering failed; the video still previews without a poster
    Failed,
}

/// Local preview handle for a staged file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidencePreview {
    pub id: PreviewId,
    pub source: FileRef,
    pub kind: PreviewKind,
    pub uri: String,
    pub thumbnail: ThumbnailState,
}

/// A thumbnail job for the caller to run against a `ThumbnailPort`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailRequest {
    pub ticket: TicketId,
    pub file: FileRef,
}

impl ThumbnailRequest {
    /// Runs the job; hand the result to `complete_thumbnail`
    pub async fn render(&self, port: &dyn ThumbnailPort) -> Result<Thumbnail, PortError> {
        port.render_thumbnail(&self.file).await
    }
}

/// What happened to a finished thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Applied,
    Failed,
    /// The slot was cleared or restaged; the result was dropped
    Discarded,
}

/// Tracks live preview handles so every create has a matching revoke
#[derive(Debug, Default)]
struct PreviewStore {
    live: HashSet<PreviewId>,
}

impl PreviewStore {
    fn create(&mut self) -> (PreviewId, String) {
        let id = PreviewId::new();
        self.live.insert(id);
        (id, format!("preview://{}", id.as_uuid()))
    }

    fn revoke(&mut self, id: PreviewId) -> bool {
        self.live.remove(&id)
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

#[derive(Debug)]
struct StagedEvidence {
    preview: EvidencePreview,
    thumbnail_handle: Option<PreviewId>,
}

/// Stages evidence files per slot and owns their preview handles
#[derive(Debug)]
pub struct EvidenceFileManager {
    max_file_bytes: u64,
    staged: HashMap<SlotKey, StagedEvidence>,
    shelved: HashMap<SlotKey, StagedEvidence>,
    pending: HashMap<TicketId, SlotKey>,
    previews: PreviewStore,
}

impl EvidenceFileManager {
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            max_file_bytes,
            staged: HashMap::new(),
            shelved: HashMap::new(),
            pending: HashMap::new(),
            previews: PreviewStore::default(),
        }
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Checks a candidate against the slot's constraints. Size is checked
    /// before type.
    pub fn check(&self, slot: SlotKind, candidate: &CandidateFile) -> Result<PreviewKind, FileError> {
        if candidate.size_bytes > self.max_file_bytes {
            return Err(FileError::FileTooLarge {
                slot,
                size_bytes: candidate.size_bytes,
                max_bytes: self.max_file_bytes,
            });
        }
        if !slot.allowed_types().contains(&candidate.mime_type.as_str()) {
            return Err(FileError::UnsupportedType {
                slot,
                mime_type: candidate.mime_type.clone(),
            });
        }
        PreviewKind::from_mime(&candidate.mime_type).ok_or_else(|| FileError::UnsupportedType {
            slot,
            mime_type: candidate.mime_type.clone(),
        })
    }

    /// Stages a file into `slot`, replacing whatever was there
    ///
    /// # Errors
    ///
    /// `FileTooLarge` or `UnsupportedType`; a rejected candidate leaves the
    /// slot's current file and preview untouched.
    pub fn stage(&mut self, slot: SlotKey, candidate: CandidateFile) -> Result<EvidencePreview, FileError> {
        let kind = match self.check(slot.kind(), &candidate) {
            Ok(kind) => kind,
            Err(error) => {
                warn!(slot = %slot.kind(), file = %candidate.name, %error, "Evidence file rejected");
                return Err(error);
            }
        };

        // Old handle goes before the new one is created
        self.release(&slot);

        let source = FileRef {
            id: FileId::new(),
            name: candidate.name,
            mime_type: candidate.mime_type,
            size_bytes: candidate.size_bytes,
        };
        let (id, uri) = self.previews.create();
        let thumbnail = if kind == PreviewKind::Video {
            let ticket = TicketId::new();
            self.pending.insert(ticket, slot);
            ThumbnailState::Pending(ticket)
        } else {
            ThumbnailState::NotApplicable
        };

        let preview = EvidencePreview {
            id,
            source,
            kind,
            uri,
            thumbnail,
        };
        debug!(slot = %slot.kind(), file = %preview.source.id, kind = ?kind, "Evidence file staged");
        self.staged.insert(
            slot,
            StagedEvidence {
                preview: preview.clone(),
                thumbnail_handle: None,
            },
        );
        Ok(preview)
    }

    /// Clears a slot, revoking its preview and any thumbnail.
    /// Returns the file that was staged there.
    pub fn release(&mut self, slot: &SlotKey) -> Option<FileRef> {
        let staged = self.staged.remove(slot)?;
        debug!(slot = %slot.kind(), file = %staged.preview.source.id, "Evidence preview released");
        Some(self.revoke(staged))
    }

    /// Moves the slot's file aside with its preview still live, leaving the
    /// slot empty. Returns false if the slot was empty.
    pub fn shelve(&mut self, slot: &SlotKey) -> bool {
        let Some(staged) = self.staged.remove(slot) else {
            return false;
        };
        debug!(slot = %slot.kind(), file = %staged.preview.source.id, "Evidence file shelved");
        if let Some(previous) = self.shelved.insert(*slot, staged) {
            self.revoke(previous);
        }
        true
    }

    /// Releases every staged or shelved file not accepted by `keep`. A
    /// shelved file that is kept returns to its slot if the slot is empty.
    pub fn retain_files<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&FileId) -> bool,
    {
        let stale: Vec<SlotKey> = self
            .staged
            .iter()
            .filter(|(_, staged)| !keep(&staged.preview.source.id))
            .map(|(slot, _)| *slot)
            .collect();
        for slot in &stale {
            self.release(slot);
        }

        let mut released = stale.len();
        let shelved: Vec<(SlotKey, StagedEvidence)> = self.shelved.drain().collect();
        for (slot, staged) in shelved {
            if !keep(&staged.preview.source.id) {
                self.revoke(staged);
                released += 1;
            } else if self.staged.contains_key(&slot) {
                self.shelved.insert(slot, staged);
            } else {
                debug!(slot = %slot.kind(), file = %staged.preview.source.id, "Shelved file restored");
                self.staged.insert(slot, staged);
            }
        }
        released
    }

    /// Releases everything, shelved files included (wizard unmount)
    pub fn release_all(&mut self) -> usize {
        let slots: Vec<SlotKey> = self.staged.keys().copied().collect();
        for slot in &slots {
            self.release(slot);
        }
        let shelved: Vec<StagedEvidence> = self.shelved.drain().map(|(_, staged)| staged).collect();
        let count = slots.len() + shelved.len();
        for staged in shelved {
            self.revoke(staged);
        }
        count
    }

    /// True if the file is staged or shelved here
    pub fn holds(&self, file: &FileId) -> bool {
        self.staged
            .values()
            .chain(self.shelved.values())
            .any(|staged| staged.preview.source.id == *file)
    }

    pub fn preview(&self, slot: &SlotKey) -> Option<&EvidencePreview> {
        self.staged.get(slot).map(|staged| &staged.preview)
    }

    pub fn file(&self, slot: &SlotKey) -> Option<&FileRef> {
        self.preview(slot).map(|preview| &preview.source)
    }

    /// Number of staged files
    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }

    /// Number of files set aside by [`EvidenceFileManager::shelve`]
    pub fn shelved_count(&self) -> usize {
        self.shelved.len()
    }

    /// Number of preview and thumbnail handles not yet revoked
    pub fn live_handles(&self) -> usize {
        self.previews.len()
    }

    /// Thumbnail jobs still outstanding
    pub fn thumbnail_requests(&self) -> Vec<ThumbnailRequest> {
        self.pending
            .iter()
            .filter_map(|(ticket, slot)| {
                [self.staged.get(slot), self.shelved.get(slot)]
                    .into_iter()
                    .flatten()
                    .find(|staged| staged.preview.thumbnail == ThumbnailState::Pending(*ticket))
                    .map(|staged| ThumbnailRequest {
                        ticket: *ticket,
                        file: staged.preview.source.clone(),
                    })
            })
            .collect()
    }

    /// Applies a finished thumbnail job. Results for tickets that are no
    /// longer pending are dropped, which releases the rendered bytes.
    pub fn complete_thumbnail(
        &mut self,
        ticket: TicketId,
        result: Result<Thumbnail, PortError>,
    ) -> ThumbnailOutcome {
        let Some(slot) = self.pending.remove(&ticket) else {
            debug!(%ticket, "Superseded thumbnail discarded");
            return ThumbnailOutcome::Discarded;
        };
        let waiting = ThumbnailState::Pending(ticket);
        let staged = match self.staged.get_mut(&slot) {
            Some(staged) if staged.preview.thumbnail == waiting => Some(staged),
            _ => self
                .shelved
                .get_mut(&slot)
                .filter(|staged| staged.preview.thumbnail == waiting),
        };
        let Some(staged) = staged else {
            return ThumbnailOutcome::Discarded;
        };

        match result {
            Ok(thumbnail) => {
                let (handle, uri) = self.previews.create();
                debug!(%ticket, bytes = thumbnail.bytes.len(), "Thumbnail applied");
                staged.thumbnail_handle = Some(handle);
                staged.preview.thumbnail = ThumbnailState::Ready { uri };
                ThumbnailOutcome::Applied
            }
            Err(error) => {
                warn!(%ticket, %error, "Thumbnail rendering failed");
                staged.preview.thumbnail = ThumbnailState::Failed;
                ThumbnailOutcome::Failed
            }
        }
    }
}

impl EvidenceFileManager {
    /// Revokes every handle a staged file holds
    fn revoke(&mut self, staged: StagedEvidence) -> FileRef {
        self.previews.revoke(staged.preview.id);
        if let Some(handle) = staged.thumbnail_handle {
            self.previews.revoke(handle);
        }
        if let ThumbnailState::Pending(ticket) = staged.preview.thumbnail {
            self.pending.remove(&ticket);
        }
        staged.preview.source
    }
}

impl Drop for EvidenceFileManager {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn manager() -> EvidenceFileManager {
        EvidenceFileManager::new(5 * MB)
    }

    #[test]
    fn test_size_checked_before_type() {
        let manager = manager();
        let candidate = CandidateFile::new("huge.gif", "image/gif", 6 * MB);
        assert!(matches!(
            manager.check(SlotKind::AccountScreenshot, &candidate),
            Err(FileError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_exactly_at_cap_is_accepted() {
        let manager = manager();
        let candidate = CandidateFile::new("edge.png", MIME_PNG, 5 * MB);
        assert_eq!(manager.check(SlotKind::AccountScreenshot, &candidate), Ok(PreviewKind::Image));
    }

    #[test]
    fn test_slot_allow_lists() {
        let manager = manager();
        let pdf = CandidateFile::new("inbox.pdf", MIME_PDF, MB);
        assert!(manager.check(SlotKind::AccountScreenshot, &pdf).is_err());
        assert_eq!(manager.check(SlotKind::EmailScreenshot, &pdf), Ok(PreviewKind::Pdf));

        let video = CandidateFile::new("clip.mp4", MIME_MP4, MB);
        assert!(manager.check(SlotKind::EmailScreenshot, &video).is_err());
        assert_eq!(manager.check(SlotKind::AdditionalFile, &video), Ok(PreviewKind::Video));
    }

    #[test]
    fn test_restage_revokes_previous_handle() {
        let mut manager = manager();
        let slot = SlotKey::Named(SlotKind::AccountScreenshot);
        let first = manager.stage(slot, CandidateFile::new("a.png", MIME_PNG, MB)).unwrap();
        let second = manager.stage(slot, CandidateFile::new("b.png", MIME_PNG, MB)).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(manager.live_handles(), 1);
        assert_eq!(manager.file(&slot).unwrap().name, "b.png");
    }

    #[test]
    fn test_rejected_candidate_keeps_current_file() {
        let mut manager = manager();
        let slot = SlotKey::Named(SlotKind::AccountScreenshot);
        manager.stage(slot, CandidateFile::new("a.png", MIME_PNG, MB)).unwrap();
        assert!(manager.stage(slot, CandidateFile::new("b.png", MIME_PNG, 9 * MB)).is_err());

        assert_eq!(manager.file(&slot).unwrap().name, "a.png");
        assert_eq!(manager.live_handles(), 1);
    }

    #[test]
    fn test_superseded_thumbnail_is_discarded() {
        let mut manager = manager();
        let slot = SlotKey::Entry(EntryId::new());
        let preview = manager.stage(slot, CandidateFile::new("clip.mp4", MIME_MP4, MB)).unwrap();
        let ThumbnailState::Pending(ticket) = preview.thumbnail else {
            panic!("video preview should wait for a thumbnail");
        };

        manager.release(&slot);
        let thumbnail = Thumbnail {
            bytes: vec![0u8; 16],
            mime_type: MIME_JPEG.to_string(),
        };
        assert_eq!(manager.complete_thumbnail(ticket, Ok(thumbnail)), ThumbnailOutcome::Discarded);
        assert_eq!(manager.live_handles(), 0);
    }

    #[test]
    fn test_shelved_file_keeps_preview_until_restored() {
        let mut manager = manager();
        let slot = SlotKey::Named(SlotKind::AccountScreenshot);
        let original = manager.stage(slot, CandidateFile::new("a.png", MIME_PNG, MB)).unwrap();

        assert!(manager.shelve(&slot));
        let replacement = manager.stage(slot, CandidateFile::new("b.png", MIME_PNG, MB)).unwrap();
        assert_eq!(manager.live_handles(), 2);
        assert!(manager.holds(&original.source.id));

        // Replacement abandoned, original restored
        let kept = original.source.id;
        assert_eq!(manager.retain_files(|id| *id == kept), 1);
        assert_eq!(manager.preview(&slot).unwrap().id, original.id);
        assert!(!manager.holds(&replacement.source.id));
        assert_eq!(manager.shelved_count(), 0);
        assert_eq!(manager.live_handles(), 1);
    }

    #[test]
    fn test_shelved_file_revoked_once_unreferenced() {
        let mut manager = manager();
        let slot = SlotKey::Named(SlotKind::AccountScreenshot);
        manager.stage(slot, CandidateFile::new("a.png", MIME_PNG, MB)).unwrap();
        manager.shelve(&slot);
        let replacement = manager.stage(slot, CandidateFile::new("b.png", MIME_PNG, MB)).unwrap();

        let kept = replacement.source.id;
        assert_eq!(manager.retain_files(|id| *id == kept), 1);
        assert_eq!(manager.file(&slot).unwrap().name, "b.png");
        assert_eq!(manager.live_handles(), 1);
    }

    #[test]
    fn test_thumbnail_reaches_shelved_video() {
        let mut manager = manager();
        let slot = SlotKey::Entry(EntryId::new());
        let preview = manager.stage(slot, CandidateFile::new("clip.mp4", MIME_MP4, MB)).unwrap();
        let ThumbnailState::Pending(ticket) = preview.thumbnail else {
            panic!("video preview should wait for a thumbnail");
        };
        manager.shelve(&slot);
        assert_eq!(manager.thumbnail_requests().len(), 1);

        let thumbnail = Thumbnail {
            bytes: vec![0u8; 16],
            mime_type: MIME_JPEG.to_string(),
        };
        assert_eq!(manager.complete_thumbnail(ticket, Ok(thumbnail)), ThumbnailOutcome::Applied);
        assert_eq!(manager.live_handles(), 2);
        assert_eq!(manager.release_all(), 1);
        assert_eq!(manager.live_handles(), 0);
    }

    #[test]
    fn test_drop_releases_everything() {
        let mut manager = manager();
        manager.stage(SlotKey::Named(SlotKind::BankStatement), CandidateFile::new("s.pdf", MIME_PDF, MB)).unwrap();
        manager.stage(SlotKey::Entry(EntryId::new()), CandidateFile::new("c.png", MIME_PNG, MB)).unwrap();
        assert_eq!(manager.release_all(), 2);
        assert_eq!(manager.live_handles(), 0);
    }
}
