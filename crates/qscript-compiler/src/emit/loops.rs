//! Break/continue bookkeeping.
//!
//! Every loop, switch and labelled statement pushes a [`LoopFrame`] while its
//! body compiles. `break` and `continue` look frames up by label (or take the
//! innermost eligible one) and register their branch sites on the frame; the
//! owner patches them once the targets are known.

use qscript_core::Name;

/// What kind of statement owns a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// `while`, `do`, `for`, `for-in`: accepts `break` and `continue`.
    Loop,
    /// Accepts `break` only.
    Switch,
    /// Any other labelled statement; accepts only `break label`.
    Labelled,
}

/// Jump targets of one breakable statement.
#[derive(Debug)]
pub struct LoopFrame {
    pub kind: FrameKind,
    /// Every label written directly in front of the statement.
    pub labels: Vec<Name>,
    /// Unwind-stack height when the frame was pushed; entries above it are
    /// crossed by a jump to this frame.
    pub unwind_depth: usize,
    /// `break` branches waiting for the end of the statement.
    pub break_sites: Vec<usize>,
    /// Known when the loop test precedes the body.
    continue_target: Option<usize>,
    /// `continue` branches emitted before the target was known.
    continue_sites: Vec<usize>,
}

impl LoopFrame {
    pub fn continue_target(&self) -> Option<usize> {
        self.continue_target
    }

    /// Record a `continue` branch to patch once the target is set.
    pub fn add_continue(&mut self, site: usize) {
        self.continue_sites.push(site);
    }

    /// Fix the continue target; returns sites recorded before it was known.
    pub fn set_continue_target(&mut self, target: usize) -> Vec<usize> {
        self.continue_target = Some(target);
        std::mem::take(&mut self.continue_sites)
    }

    pub fn has_pending_continues(&self) -> bool {
        !self.continue_sites.is_empty()
    }
}

/// Why a `break`/`continue` found no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakError {
    /// The label names no enclosing frame.
    UndefinedLabel,
    /// Unlabelled `break` outside any loop or switch.
    NotBreakable,
    /// Unlabelled `continue` outside any loop.
    NotInLoop,
    /// `continue label` where the label is not on a loop.
    NotALoop,
}

/// Stack of frames, innermost last.
///
/// # Example
///
/// ```
/// use qscript_compiler::emit::{BreakError, FrameKind, LoopStack};
/// use qscript_core::NameTable;
///
/// let mut names = NameTable::new();
/// let outer = names.intern("outer");
///
/// let mut loops = LoopStack::new();
/// loops.push(FrameKind::Loop, &[outer], Some(0), 0);
/// loops.push(FrameKind::Switch, &[], None, 0);
///
/// assert_eq!(loops.find_break(None), Ok(1));
/// assert_eq!(loops.find_continue(None), Ok(0));
/// assert_eq!(loops.find_break(Some(outer)), Ok(0));
/// assert_eq!(loops.find_break(Some(names.intern("inner"))), Err(BreakError::UndefinedLabel));
/// ```
#[derive(Debug, Default)]
pub struct LoopStack {
    frames: Vec<LoopFrame>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a frame and return its index.
    pub fn push(
        &mut self,
        kind: FrameKind,
        labels: &[Name],
        continue_target: Option<usize>,
        unwind_depth: usize,
    ) -> usize {
        self.frames.push(LoopFrame {
            kind,
            labels: labels.to_vec(),
            unwind_depth,
            break_sites: Vec::new(),
            continue_target,
            continue_sites: Vec::new(),
        });
        self.frames.len() - 1
    }

    pub fn pop(&mut self) -> Option<LoopFrame> {
        self.frames.pop()
    }

    pub fn top_mut(&mut self) -> Option<&mut LoopFrame> {
        self.frames.last_mut()
    }

    pub fn frame(&self, index: usize) -> &LoopFrame {
        &self.frames[index]
    }

    pub fn frame_mut(&mut self, index: usize) -> &mut LoopFrame {
        &mut self.frames[index]
    }

    /// Number of active frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether any active frame carries `label`.
    pub fn has_label(&self, label: Name) -> bool {
        self.frames.iter().any(|f| f.labels.contains(&label))
    }

    fn find_label(&self, label: Name) -> Option<usize> {
        self.frames.iter().rposition(|f| f.labels.contains(&label))
    }

    /// Index of the frame a `break` targets: the labelled one, or the
    /// innermost loop or switch.
    pub fn find_break(&self, label: Option<Name>) -> Result<usize, BreakError> {
        match label {
            Some(label) => self.find_label(label).ok_or(BreakError::UndefinedLabel),
            None => self
                .frames
                .iter()
                .rposition(|f| f.kind != FrameKind::Labelled)
                .ok_or(BreakError::NotBreakable),
        }
    }

    /// Index of the loop a `continue` targets.
    pub fn find_continue(&self, label: Option<Name>) -> Result<usize, BreakError> {
        match label {
            Some(label) => {
                let index = self.find_label(label).ok_or(BreakError::UndefinedLabel)?;
                if self.frames[index].kind == FrameKind::Loop {
                    Ok(index)
                } else {
                    Err(BreakError::NotALoop)
                }
            }
            None => self
                .frames
                .iter()
                .rposition(|f| f.kind == FrameKind::Loop)
                .ok_or(BreakError::NotInLoop),
        }
    }

    /// Detach every frame pushed above unwind height `depth`.
    ///
    /// Used while compiling an inlined `finally` body, which must not see
    /// frames belonging to the statements it is being copied out of.
    pub fn hide_above(&mut self, depth: usize) -> Vec<LoopFrame> {
        let keep = self.frames.partition_point(|f| f.unwind_depth <= depth);
        self.frames.split_off(keep)
    }

    /// Put back frames taken by [`hide_above`](Self::hide_above).
    pub fn restore(&mut self, hidden: Vec<LoopFrame>) {
        self.frames.extend(hidden);
    }
}
