/// JPEG quality level and the slider/text input model
///
/// The slider and the text field both edit one value. Text edits keep
/// whatever the user typed; slider moves rewrite the text. Nothing ever
/// flows from the text field back into itself, so there is no feedback loop.

use std::fmt;

/// Encoder quality in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(0);
    pub const MAX: Quality = Quality(100);

    /// Build a quality, clamping out-of-range values
    pub fn new(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0)) as u8)
    }

    /// Parse user text. Anything that is not an integer counts as 0.
    pub fn parse(text: &str) -> Self {
        text.trim()
            .parse::<i64>()
            .map(Self::new)
            .unwrap_or(Self::MIN)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single source of truth for the quality inputs
#[derive(Debug, Clone, Default)]
pub struct QualityControl {
    /// None until the user touches either input
    value: Option<Quality>,
    /// Raw contents of the text field
    text: String,
}

impl QualityControl {
    pub fn new(initial: Option<Quality>) -> Self {
        Self {
            value: initial,
            text: initial.map(|q| q.to_string()).unwrap_or_default(),
        }
    }

    /// The text field changed; returns the quality to request
    pub fn on_text(&mut self, text: String) -> Quality {
        let quality = Quality::parse(&text);
        self.text = text;
        self.value = Some(quality);
        quality
    }

    /// The slider moved; mirrors the value into the text field
    pub fn on_slider(&mut self, value: u8) -> Quality {
        let quality = Quality::new(i64::from(value));
        self.text = quality.to_string();
        self.value = Some(quality);
        quality
    }

    /// Quality used for requests; unset behaves like 0
    pub fn effective(&self) -> Quality {
        self.value.unwrap_or(Quality::MIN)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Position shown by the slider
    pub fn slider_value(&self) -> u8 {
        self.effective().get()
    }
}
