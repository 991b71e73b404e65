// status.rs
//
// Copyright (c) 2026  gifcodec developers
//
//! Data-quality state of decoded components
use bitflags::bitflags;

bitflags! {
    /// Data-quality conditions detected while decoding.
    ///
    /// Conditions combine freely; the empty set ([ErrorState::OK]) means no
    /// problem was found.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorState: u32 {
        /// Header signature is not "GIF".
        const BAD_SIGNATURE = 1 << 0;
        /// Header version is neither "87a" nor "89a".
        const UNSUPPORTED_VERSION = 1 << 1;
        /// Input ended before the component was complete.
        const END_OF_INPUT_STREAM = 1 << 2;
        /// Colour table has fewer bytes than its declared length.
        const COLOUR_TABLE_TOO_SHORT = 1 << 3;
        /// Data sub-block has fewer bytes than its size prefix.
        const DATA_BLOCK_TOO_SHORT = 1 << 4;
        /// Fixed-size block has an unexpected size.
        const BAD_BLOCK_SIZE = 1 << 5;
        /// LZW minimum code size cannot be decoded.
        const BAD_LZW_MINIMUM_CODE_SIZE = 1 << 6;
        /// LZW code is neither reserved nor in the dictionary.
        const CODE_NOT_IN_DICTIONARY = 1 << 7;
        /// Image data holds fewer pixels than the image descriptor.
        const TOO_FEW_PIXELS_IN_IMAGE_DATA = 1 << 8;
        /// Image data holds more pixels than the image descriptor.
        const TOO_MANY_PIXELS_IN_IMAGE_DATA = 1 << 9;
        /// Pixel index beyond the end of the active colour table.
        const BAD_COLOUR_INDEX = 1 << 10;
        /// Frame has no pixels to composite.
        const NO_IMAGE_DATA = 1 << 11;
        /// Frame has neither a local nor a global colour table.
        const FRAME_HAS_NO_COLOUR_TABLE = 1 << 12;
        /// Unrecognized block introducer byte.
        const UNKNOWN_BLOCK_INTRODUCER = 1 << 13;
        /// Unrecognized extension label.
        const UNKNOWN_EXTENSION = 1 << 14;
        /// Frame larger than the configured maximum image size.
        const IMAGE_TOO_LARGE = 1 << 15;
    }
}

impl ErrorState {
    /// No problem found
    pub const OK: Self = Self::empty();
}

/// Error state of one component, with a log of messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentStatus {
    /// Accumulated conditions
    state: ErrorState,
    /// One message per recorded condition
    messages: Vec<String>,
}

impl ComponentStatus {
    /// Get the accumulated state
    pub fn state(&self) -> ErrorState {
        self.state
    }

    /// Check whether no condition was recorded
    pub fn is_ok(&self) -> bool {
        self.state.is_empty()
    }

    /// Get the messages, joined with newlines
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }

    /// Record a condition
    pub(crate) fn record(&mut self, state: ErrorState, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{:?}: {}", state, msg);
        self.state |= state;
        self.messages.push(msg);
    }
}

/// A decoded component carrying a [ComponentStatus].
///
/// Composite components list their directly owned parts, so the
/// consolidated state of a whole structure is a fold over the tree.
pub trait Component {
    /// Get the component's own status
    fn status(&self) -> &ComponentStatus;

    /// Get directly owned sub-components
    fn parts(&self) -> Vec<&dyn Component> {
        Vec::new()
    }

    /// Get the component's own error state
    fn error_state(&self) -> ErrorState {
        self.status().state()
    }

    /// Get the error state of the component and all of its parts
    fn consolidated_state(&self) -> ErrorState {
        self.parts()
            .into_iter()
            .fold(self.error_state(), |st, p| st | p.consolidated_state())
    }

    /// Check whether every condition in `state` is in the consolidated state
    fn test_state(&self, state: ErrorState) -> bool {
        self.consolidated_state().contains(state)
    }

    /// Get messages of the component and all of its parts
    fn consolidated_messages(&self) -> Vec<String> {
        let mut msgs = Vec::new();
        if !self.status().is_ok() {
            msgs.push(self.status().message());
        }
        for part in self.parts() {
            msgs.extend(part.consolidated_messages());
        }
        msgs
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Leaf(ComponentStatus);

    struct Branch {
        status: ComponentStatus,
        leaves: Vec<Leaf>,
        branch: Option<Box<Branch>>,
    }

    impl Component for Leaf {
        fn status(&self) -> &ComponentStatus {
            &self.0
        }
    }

    impl Component for Branch {
        fn status(&self) -> &ComponentStatus {
            &self.status
        }
        fn parts(&self) -> Vec<&dyn Component> {
            let mut parts: Vec<&dyn Component> = Vec::new();
            for leaf in &self.leaves {
                parts.push(leaf);
            }
            if let Some(b) = &self.branch {
                parts.push(b.as_ref());
            }
            parts
        }
    }

    fn status(state: ErrorState) -> ComponentStatus {
        let mut st = ComponentStatus::default();
        if !state.is_empty() {
            st.record(state, format!("{state:?}"));
        }
        st
    }

    #[test]
    fn ok_is_empty() {
        assert_eq!(ErrorState::OK.bits(), 0);
        assert_eq!(ErrorState::default(), ErrorState::OK);
        assert!(ComponentStatus::default().is_ok());
    }

    #[test]
    fn record_accumulates() {
        let mut st = ComponentStatus::default();
        st.record(ErrorState::BAD_SIGNATURE, "first");
        st.record(ErrorState::END_OF_INPUT_STREAM, "second");
        assert_eq!(
            st.state(),
            ErrorState::BAD_SIGNATURE | ErrorState::END_OF_INPUT_STREAM
        );
        assert_eq!(st.message(), "first\nsecond");
    }

    #[test]
    fn consolidated_nested() {
        let inner = Branch {
            status: status(ErrorState::BAD_COLOUR_INDEX),
            leaves: vec![Leaf(status(ErrorState::DATA_BLOCK_TOO_SHORT))],
            branch: None,
        };
        let outer = Branch {
            status: status(ErrorState::OK),
            leaves: vec![
                Leaf(status(ErrorState::OK)),
                Leaf(status(ErrorState::BAD_SIGNATURE)),
            ],
            branch: Some(Box::new(inner)),
        };
        let all = ErrorState::BAD_COLOUR_INDEX
            | ErrorState::DATA_BLOCK_TOO_SHORT
            | ErrorState::BAD_SIGNATURE;
        assert_eq!(outer.error_state(), ErrorState::OK);
        assert_eq!(outer.consolidated_state(), all);
        assert!(outer.test_state(ErrorState::OK));
        assert!(outer.test_state(
            ErrorState::BAD_SIGNATURE | ErrorState::DATA_BLOCK_TOO_SHORT
        ));
        assert!(!outer.test_state(
            ErrorState::BAD_SIGNATURE | ErrorState::NO_IMAGE_DATA
        ));
        assert_eq!(outer.consolidated_messages().len(), 3);
    }
}
