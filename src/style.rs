//! Style dispatch table.
//!
//! Each [`SoundStyle`] owns a scale for hash-derived pitch, a transaction
//! recipe, an ERC-20 recipe and a percussion pattern. The table is looked up
//! once per trigger by enum key.

use crate::mapper::{DORIAN, PENTATONIC, WHOLE_TONE};
use crate::sequencer::{self, Pattern};
use crate::settings::SoundStyle;
use crate::voices::{Erc20Recipe, TransactionRecipe, erc20, transaction};

/// Everything a style decides.
#[derive(Clone, Copy)]
pub struct StyleProfile {
    pub style: SoundStyle,
    pub scale: &'static [i32],
    pub transaction: TransactionRecipe,
    pub erc20: Erc20Recipe,
    pub pattern: Pattern,
}

impl std::fmt::Debug for StyleProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleProfile")
            .field("style", &self.style)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

static PROFILES: [StyleProfile; 6] = [
    StyleProfile {
        style: SoundStyle::Acid,
        scale: WHOLE_TONE,
        transaction: transaction::acid,
        erc20: erc20::acid,
        pattern: sequencer::acid_pattern,
    },
    StyleProfile {
        style: SoundStyle::Jazz,
        scale: DORIAN,
        transaction: transaction::jazz,
        erc20: erc20::jazz,
        pattern: sequencer::jazz_pattern,
    },
    StyleProfile {
        style: SoundStyle::Electronic,
        scale: WHOLE_TONE,
        transaction: transaction::electronic,
        erc20: erc20::electronic,
        pattern: sequencer::electronic_pattern,
    },
    StyleProfile {
        style: SoundStyle::Piano,
        scale: PENTATONIC,
        transaction: transaction::piano,
        erc20: erc20::piano,
        pattern: sequencer::piano_pattern,
    },
    StyleProfile {
        style: SoundStyle::Minimal,
        scale: PENTATONIC,
        transaction: transaction::minimal,
        erc20: erc20::minimal,
        pattern: sequencer::minimal_pattern,
    },
    StyleProfile {
        style: SoundStyle::Retro,
        scale: PENTATONIC,
        transaction: transaction::retro,
        erc20: erc20::retro,
        pattern: sequencer::retro_pattern,
    },
];

/// The profile for `style`.
pub fn profile(style: SoundStyle) -> &'static StyleProfile {
    let index = match style {
        SoundStyle::Acid => 0,
        SoundStyle::Jazz => 1,
        SoundStyle::Electronic => 2,
        SoundStyle::Piano => 3,
        SoundStyle::Minimal => 4,
        SoundStyle::Retro => 5,
    };
    &PROFILES[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_keyed_by_style() {
        for style in SoundStyle::ALL {
            assert_eq!(profile(style).style, style);
        }
    }

    #[test]
    fn scales_per_style() {
        assert_eq!(profile(SoundStyle::Jazz).scale, DORIAN);
        assert_eq!(profile(SoundStyle::Acid).scale, WHOLE_TONE);
        assert_eq!(profile(SoundStyle::Electronic).scale, WHOLE_TONE);
        assert_eq!(profile(SoundStyle::Minimal).scale, PENTATONIC);
        assert_eq!(profile(SoundStyle::Piano).scale, PENTATONIC);
    }

    #[test]
    fn patterns_come_from_the_table() {
        let retro = profile(SoundStyle::Retro);
        assert_eq!((retro.pattern)(6), sequencer::retro_pattern(6));
        assert!(format!("{retro:?}").contains("Retro"));
    }
}
