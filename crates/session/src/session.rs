use crate::coalesce::{CoalescedEdit, EditCoalescer, TextChange};
use crate::config::SessionConfig;
use crate::error::SessionError;
use script_tree::{EditError, EditOutcome, Node, OffsetLedger, OutlineEntry, Script};
use std::ops::Range;
use std::path::Path;
use std::time::Instant;
use tools::{byte_index, char_len};

/// Owns one script together with its flat text and offset ledger.
///
/// Keystrokes go into the text buffer immediately and are written back into
/// the script in debounced bursts. Structural edits settle pending text first
/// and then re-flatten, so the ledger always describes the buffer.
///
/// # Example
///
/// ```
/// use session::{EditSession, SessionConfig, TextChange};
/// use script_tree::Script;
/// use std::time::{Duration, Instant};
///
/// let mut session = EditSession::new(Script::new_empty(), SessionConfig::default()).unwrap();
/// let intro = session.outline()[1].id.clone();
/// let at = session.ledger().get(&intro).unwrap().body_start;
///
/// let t0 = Instant::now();
/// session.record_change(TextChange::insert(at, "Hi! "), t0).unwrap();
/// assert!(session.tick(t0 + Duration::from_millis(400)).is_some());
/// let text = session.script().lookup(&intro).and_then(|n| n.text()).unwrap();
/// assert!(text.starts_with("Hi! Welcome"));
/// ```
#[derive(Debug)]
pub struct EditSession {
    script: Script,
    text: String,
    ledger: OffsetLedger,
    coalescer: EditCoalescer,
    config: SessionConfig,
    diverged: bool,
}

impl EditSession {
    pub fn new(script: Script, config: SessionConfig) -> Result<Self, SessionError> {
        let flat = script.flatten()?;
        Ok(Self {
            script,
            text: flat.text,
            ledger: flat.ledger,
            coalescer: EditCoalescer::new(config.debounce),
            config,
            diverged: false,
        })
    }

    /// Load `path`, refusing documents older than `config.required_version`.
    pub fn open(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self, SessionError> {
        let script = Script::load_requiring(path, config.required_version)?;
        Self::new(script, config)
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ledger(&self) -> &OffsetLedger {
        &self.ledger
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn outline(&self) -> Vec<OutlineEntry> {
        self.script.outline()
    }

    /// Header spans of the flat text, for styling headers apart from bodies.
    pub fn header_ranges(&self) -> Vec<Range<usize>> {
        self.ledger.header_ranges().collect()
    }

    pub fn has_pending_edit(&self) -> bool {
        self.coalescer.is_pending()
    }

    /// True after an edit could not be attributed to any body: the buffer
    /// holds text the script does not. Cleared by [`EditSession::resync`]
    /// and by structural edits.
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    // =========================================================================
    // Text editing
    // =========================================================================

    /// Apply one keystroke-level change to the buffer and queue it for
    /// reconciliation.
    ///
    /// If the change does not continue the pending burst, that burst is
    /// reconciled first and its outcome returned. An out-of-range change is
    /// refused and leaves everything untouched.
    pub fn record_change(
        &mut self,
        change: TextChange,
        now: Instant,
    ) -> Result<Option<EditOutcome>, SessionError> {
        let total = char_len(&self.text);
        let end = change.position.saturating_add(change.removed);
        if end > total {
            return Err(SessionError::ChangeOutOfRange {
                position: change.position,
                removed: change.removed,
                len: total,
            });
        }

        let settled = self
            .coalescer
            .push(&change, now)
            .and_then(|burst| self.settle(burst));

        // both indices are within `total`, checked above
        let from = byte_index(&self.text, change.position).unwrap_or(self.text.len());
        let to = byte_index(&self.text, end).unwrap_or(self.text.len());
        self.text.replace_range(from..to, &change.added);
        log::trace!(
            target: "session",
            "change at {}: -{} +{}",
            change.position,
            change.removed,
            change.added_len()
        );
        Ok(settled)
    }

    /// Reconcile the pending burst once the debounce window has passed.
    pub fn tick(&mut self, now: Instant) -> Option<EditOutcome> {
        let burst = self.coalescer.due(now)?;
        self.settle(burst)
    }

    /// Reconcile the pending burst now.
    pub fn flush(&mut self) -> Option<EditOutcome> {
        let burst = self.coalescer.take()?;
        self.settle(burst)
    }

    /// Direct reconciliation of an edit already present in `full_text`.
    ///
    /// The buffer becomes `full_text` whether or not the edit lands in a body.
    pub fn apply_edit(
        &mut self,
        last_cursor: usize,
        new_cursor: usize,
        full_text: &str,
    ) -> Result<EditOutcome, EditError> {
        if let Some(outcome) = self.flush() {
            log::debug!(target: "session", "settled pending edit in {}", outcome.node_id);
        }
        self.text = full_text.to_string();
        self.reconcile(last_cursor, new_cursor)
    }

    fn settle(&mut self, burst: CoalescedEdit) -> Option<EditOutcome> {
        self.reconcile(burst.last_cursor, burst.new_cursor).ok()
    }

    fn reconcile(
        &mut self,
        last_cursor: usize,
        new_cursor: usize,
    ) -> Result<EditOutcome, EditError> {
        match self
            .script
            .apply_edit(&mut self.ledger, last_cursor, new_cursor, &self.text)
        {
            Ok(outcome) => {
                log::debug!(
                    target: "session",
                    "edit {last_cursor}->{new_cursor} written to {}",
                    outcome.node_id
                );
                Ok(outcome)
            }
            Err(err) => {
                log::warn!(target: "session", "{err}; buffer and script now differ");
                self.diverged = true;
                Err(err)
            }
        }
    }

    /// Throw away unattributed buffer changes and re-render from the script.
    pub fn resync(&mut self) -> Result<(), SessionError> {
        self.flush();
        self.refresh()
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    pub fn add_element(
        &mut self,
        parent_id: &str,
        tag: &str,
        content: Option<String>,
        attributes: Vec<(String, String)>,
    ) -> Result<String, SessionError> {
        self.flush();
        let id = self.script.add_element(parent_id, tag, content, attributes)?;
        self.refresh()?;
        Ok(id)
    }

    pub fn drop_element(&mut self, id: &str) -> Result<Node, SessionError> {
        self.flush();
        let removed = self.script.drop_element(id)?;
        self.refresh()?;
        Ok(removed)
    }

    pub fn set_property(
        &mut self,
        id: &str,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.flush();
        self.script.set_property(id, name, value)?;
        self.refresh()
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), SessionError> {
        self.flush();
        self.script.set_title(title);
        self.refresh()
    }

    /// Settle pending text and write the script to `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        self.flush();
        if self.diverged {
            log::warn!(target: "session", "saving while the buffer holds unattributed text");
        }
        self.script.save(path)?;
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), SessionError> {
        let flat = self.script.flatten()?;
        self.text = flat.text;
        self.ledger = flat.ledger;
        self.diverged = false;
        log::debug!(
            target: "session",
            "re-flattened: {} readable nodes, {} chars",
            self.ledger.len(),
            char_len(&self.text)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use script_tree::BatchSerial;
    use std::time::Duration;

    const XML: &str = r#"<cscr version="1.0">
  <title>Pilot</title>
  <transition desc="Fade In" readable="_tag_desc" />
  <monologue desc="Intro" readable="_tag_desc_body">Hello</monologue>
  <clip start="0" end="900" readable="Cold open">cold</clip>
</cscr>"#;

    fn session() -> EditSession {
        let script = Script::from_xml_with_serial(XML, BatchSerial::fixed(1)).expect("loads");
        EditSession::new(script, SessionConfig::default()).expect("flattens")
    }

    fn body_start(s: &EditSession, id: &str) -> usize {
        s.ledger().get(id).expect("entry").body_start
    }

    fn node_text<'a>(s: &'a EditSession, id: &str) -> Option<&'a str> {
        s.script().lookup(id).and_then(Node::text)
    }

    fn assert_in_sync(s: &EditSession) {
        let fresh = s.script().flatten().expect("flattens");
        assert_eq!(fresh.text, s.text());
        assert_eq!(&fresh.ledger, s.ledger());
    }

    #[test]
    fn keystrokes_stay_in_buffer_until_quiet() {
        let mut s = session();
        let t0 = Instant::now();
        let at = body_start(&s, "monologue3-1") + 5;
        for (i, ch) in " world".chars().enumerate() {
            let when = t0 + Duration::from_millis(i as u64 * 40);
            assert_eq!(s.record_change(TextChange::insert(at + i, ch), when).expect("in range"), None);
        }
        assert!(s.text().contains("Hello world\n\n"));
        assert_eq!(node_text(&s, "monologue3-1"), Some("Hello"));
        assert!(s.has_pending_edit());

        assert_eq!(s.tick(t0 + Duration::from_millis(300)), None);
        let outcome = s.tick(t0 + Duration::from_millis(600)).expect("due");
        assert_eq!(outcome.node_id, "monologue3-1");
        assert_eq!(node_text(&s, "monologue3-1"), Some("Hello world"));
        assert!(!s.has_pending_edit());
        assert_in_sync(&s);
    }

    #[test]
    fn jumping_to_another_body_settles_the_first() {
        let mut s = session();
        let t0 = Instant::now();
        let intro = body_start(&s, "monologue3-1");
        s.record_change(TextChange::insert(intro, "Oh, "), t0).expect("in range");

        // the ledger has not seen the pending insertion yet
        let caption = body_start(&s, "clip4-1") + 4;
        let settled = s
            .record_change(TextChange::insert(caption + 4, "est"), t0)
            .expect("in range")
            .expect("first burst settled");
        assert_eq!(settled.text, "Oh, Hello");

        s.flush().expect("second burst");
        assert_eq!(
            s.script().get_property("clip4-1", "readable"),
            Ok(Some("Coldest open"))
        );
        assert_in_sync(&s);
    }

    #[test]
    fn typing_in_a_header_diverges_until_resync() {
        let mut s = session();
        let t0 = Instant::now();
        let header = s.ledger().get("monologue3-1").expect("entry").header_start() + 3;
        s.record_change(TextChange::insert(header, "zz"), t0).expect("in range");
        assert_eq!(s.flush(), None);
        assert!(s.is_diverged());
        assert!(s.text().contains("[Mozznologue"));

        s.resync().expect("re-flattens");
        assert!(!s.is_diverged());
        assert!(!s.text().contains("zz"));
        assert_in_sync(&s);
    }

    #[test]
    fn out_of_range_change_is_refused() {
        let mut s = session();
        let len = char_len(s.text());
        let before = s.text().to_string();
        assert!(matches!(
            s.record_change(TextChange::delete(len - 1, 2), Instant::now()),
            Err(SessionError::ChangeOutOfRange { .. })
        ));
        assert_eq!(s.text(), before);
        assert!(!s.has_pending_edit());
    }

    #[test]
    fn direct_apply_edit_replaces_buffer() {
        let mut s = session();
        let at = body_start(&s, "monologue3-1");
        let mut text = s.text().to_string();
        let byte = byte_index(&text, at).expect("in range");
        text.insert_str(byte, "Well, ");
        let outcome = s.apply_edit(at, at + 6, &text).expect("attributed");
        assert_eq!(outcome.text, "Well, Hello");
        assert_eq!(s.text(), text);
        assert_in_sync(&s);

        let err = s.apply_edit(1, 2, "garbage").unwrap_err();
        assert_eq!(err, EditError::NoTargetSection { position: 1 });
        assert_eq!(s.text(), "garbage");
        assert!(s.is_diverged());
    }

    #[test]
    fn structural_edits_settle_and_reflatten() {
        let mut s = session();
        let t0 = Instant::now();
        let at = body_start(&s, "monologue3-1") + 5;
        s.record_change(TextChange::insert(at, "!"), t0).expect("in range");

        let id = s
            .add_element(
                "cscr0-1",
                "monologue",
                Some("Later".into()),
                vec![
                    ("desc".into(), "Outro".into()),
                    ("readable".into(), "_tag_desc_body".into()),
                ],
            )
            .expect("added");
        assert_eq!(node_text(&s, "monologue3-1"), Some("Hello!"));
        assert!(s.text().ends_with("[Monologue - Outro]\n\nLater\n\n"));
        assert!(s.ledger().get(&id).is_some());
        assert_in_sync(&s);

        s.set_property("transition2-1", "desc", "Smash Cut").expect("set");
        assert!(s.text().starts_with("[Transition - Smash Cut]"));

        s.drop_element("clip4-1").expect("dropped");
        assert!(!s.text().contains("Cold open"));
        assert_eq!(s.outline().len(), 3);
        assert_in_sync(&s);

        assert!(matches!(
            s.drop_element("cscr0-1"),
            Err(SessionError::Property(_))
        ));
    }

    #[test]
    fn header_ranges_follow_edits() {
        let mut s = session();
        s.add_element(
            "cscr0-1",
            "transition",
            None,
            vec![
                ("desc".into(), "Fade Out".into()),
                ("readable".into(), "_tag_desc".into()),
            ],
        )
        .expect("added");
        let before = s.header_ranges();
        assert_eq!(before.len(), 3);

        let at = body_start(&s, "monologue3-1");
        let mut text = s.text().to_string();
        text.insert_str(byte_index(&text, at).expect("in range"), "abc");
        s.apply_edit(at, at + 3, &text).expect("attributed");
        let after = s.header_ranges();
        assert_eq!(before[..2], after[..2]);
        assert_eq!(after[2], before[2].start + 3..before[2].end + 3);
    }
}
