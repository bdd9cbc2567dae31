/// Edge detector for the infinite-scroll sentinel.
///
/// Emits at most one advance per hidden-to-visible transition, and only when
/// the pager's gate is open at that moment.
#[derive(Debug, Default)]
pub struct ScrollTrigger {
    visible: bool,
}

impl ScrollTrigger {
    pub fn new() -> Self { Self::default() }

    pub fn observe(&mut self, visible: bool, can_advance: bool) -> bool {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        became_visible && can_advance
    }

    /// Forget the last observation so a sentinel that is still on screen
    /// counts as newly visible. Called once a load has settled.
    pub fn rearm(&mut self) { self.visible = false; }

    pub fn is_visible(&self) -> bool { self.visible }
}
