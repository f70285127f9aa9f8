//! Secret codes and the effects they unlock.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// What a recognised cheat code does.
///
/// Currency effects run through the ledger like any other credit. The two
/// display modes live for the current process only and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheatEffect {
    /// Credit the given number of rocks.
    GrantRocks(u64),
    /// Paint output in rainbow colors for the rest of the session.
    RainbowText,
    /// Expose internal counters and the transaction log for the session.
    DebugOverlay,
}

/// Registry entry: the effect plus a line for the hidden listing.
#[derive(Debug, Clone, Copy)]
pub struct CheatCode {
    /// Token the player has to type, lower case.
    pub token: &'static str,
    /// Effect applied when the code is entered.
    pub effect: CheatEffect,
    /// Description shown by the `cheats` listing in debug mode.
    pub description: &'static str,
}

static REGISTRY: Lazy<HashMap<&'static str, CheatCode>> = Lazy::new(|| {
    let codes = [
        CheatCode {
            token: "millionaire",
            effect: CheatEffect::GrantRocks(1000),
            description: "Give 1000 Rocks to the player",
        },
        CheatCode {
            token: "lucky",
            effect: CheatEffect::GrantRocks(777),
            description: "Give 777 Rocks to the player",
        },
        CheatCode {
            token: "geologist",
            effect: CheatEffect::GrantRocks(100),
            description: "Give 100 Rocks to the player",
        },
        CheatCode {
            token: "quarry",
            effect: CheatEffect::RainbowText,
            description: "Activate rainbow text mode",
        },
        CheatCode {
            token: "debug",
            effect: CheatEffect::DebugOverlay,
            description: "Show advanced game information",
        },
    ];
    codes.into_iter().map(|code| (code.token, code)).collect()
});

/// Look up a token already lower-cased and trimmed by the classifier.
pub fn lookup(token: &str) -> Option<CheatCode> {
    REGISTRY.get(token).copied()
}

/// Every registered code, sorted by token, for the hidden listing.
pub fn all() -> Vec<CheatCode> {
    let mut codes: Vec<_> = REGISTRY.values().copied().collect();
    codes.sort_by_key(|code| code.token);
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tokens_resolve_to_their_effects() {
        assert_eq!(
            lookup("millionaire").map(|code| code.effect),
            Some(CheatEffect::GrantRocks(1000))
        );
        assert_eq!(
            lookup("lucky").map(|code| code.effect),
            Some(CheatEffect::GrantRocks(777))
        );
        assert_eq!(
            lookup("quarry").map(|code| code.effect),
            Some(CheatEffect::RainbowText)
        );
        assert_eq!(
            lookup("debug").map(|code| code.effect),
            Some(CheatEffect::DebugOverlay)
        );
    }

    #[test]
    fn unknown_tokens_miss() {
        assert!(lookup("xyzzy").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn listing_is_sorted_and_complete() {
        let codes = all();
        assert_eq!(codes.len(), 5);
        let mut tokens: Vec<_> = codes.iter().map(|code| code.token).collect();
        let listed_order = tokens.clone();
        tokens.sort_unstable();
        assert_eq!(tokens, listed_order);
    }
}
