/// The three top-level regions that can own unconsumed keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    #[default]
    ResourceList,
    ContextList,
    DetailPanel,
}

impl FocusArea {
    pub const RING: &'static [FocusArea] = &[
        FocusArea::ResourceList,
        FocusArea::ContextList,
        FocusArea::DetailPanel,
    ];

    pub fn next(&self) -> FocusArea {
        let idx = Self::RING.iter().position(|f| f == self).unwrap_or(0);
        Self::RING[(idx + 1) % Self::RING.len()]
    }

    pub fn prev(&self) -> FocusArea {
        let idx = Self::RING.iter().position(|f| f == self).unwrap_or(0);
        if idx == 0 {
            Self::RING[Self::RING.len() - 1]
        } else {
            Self::RING[idx - 1]
        }
    }

    /// One level deeper in the hierarchy, if there is one.
    pub fn deeper(&self) -> Option<FocusArea> {
        match self {
            FocusArea::ResourceList => Some(FocusArea::ContextList),
            FocusArea::ContextList => Some(FocusArea::DetailPanel),
            FocusArea::DetailPanel => None,
        }
    }

    /// One level shallower, if there is one.
    pub fn shallower(&self) -> Option<FocusArea> {
        match self {
            FocusArea::ResourceList => None,
            FocusArea::ContextList => Some(FocusArea::ResourceList),
            FocusArea::DetailPanel => Some(FocusArea::ContextList),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FocusArea::ResourceList => "servers",
            FocusArea::ContextList => "sites",
            FocusArea::DetailPanel => "detail",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(FocusArea::ResourceList, FocusArea::ContextList)]
    #[case(FocusArea::ContextList, FocusArea::DetailPanel)]
    #[case(FocusArea::DetailPanel, FocusArea::ResourceList)]
    fn test_next_wraps(#[case] from: FocusArea, #[case] expected: FocusArea) {
        assert_eq!(from.next(), expected);
        assert_eq!(expected.prev(), from);
    }

    #[rstest]
    #[case(FocusArea::ResourceList)]
    #[case(FocusArea::ContextList)]
    #[case(FocusArea::DetailPanel)]
    fn test_full_cycle_returns_to_start(#[case] start: FocusArea) {
        let mut focus = start;
        for _ in 0..FocusArea::RING.len() {
            focus = focus.next();
            assert!(FocusArea::RING.contains(&focus));
        }
        assert_eq!(focus, start);

        for _ in 0..FocusArea::RING.len() {
            focus = focus.prev();
        }
        assert_eq!(focus, start);
    }

    #[test]
    fn test_depth_transitions() {
        assert_eq!(FocusArea::ResourceList.deeper(), Some(FocusArea::ContextList));
        assert_eq!(FocusArea::DetailPanel.deeper(), None);
        assert_eq!(FocusArea::ResourceList.shallower(), None);
        assert_eq!(FocusArea::DetailPanel.shallower(), Some(FocusArea::ContextList));
    }
}
