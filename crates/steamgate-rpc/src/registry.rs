//! The compiled method and event registry.
//!
//! Declares every operation and event the bridge can expose, per group. The
//! registry is data, fixed at compile time; the exposed surface is this
//! registry intersected with the configured name filters.

/// One callable backend operation.
#[derive(Clone, Copy, Debug)]
pub struct OperationSpec {
    /// Bare operation name.
    pub name: &'static str,
    /// Argument position of the completion callback, for operations that
    /// complete through one instead of their return value.
    pub callback_arg: Option<usize>,
}

/// Operations and events registered under one group.
#[derive(Clone, Copy, Debug)]
pub struct GroupSpec {
    /// Group name, the namespace in qualified method names.
    pub group: &'static str,
    /// Callable operations.
    pub operations: &'static [OperationSpec],
    /// Emittable events.
    pub events: &'static [&'static str],
}

const fn sync(name: &'static str) -> OperationSpec {
    OperationSpec {
        name,
        callback_arg: None,
    }
}

const fn with_callback(name: &'static str, at: usize) -> OperationSpec {
    OperationSpec {
        name,
        callback_arg: Some(at),
    }
}

/// Every group the bridge can expose.
pub const REGISTRY: &[GroupSpec] = &[
    GroupSpec {
        group: "steam",
        operations: &[
            sync("getProperty"),
            sync("gamesPlayed"),
            sync("setPersonaName"),
            sync("setPersonaState"),
            sync("sendMessage"),
            sync("addFriend"),
            sync("removeFriend"),
            sync("joinChat"),
            sync("leaveChat"),
            sync("lockChat"),
            sync("unlockChat"),
            sync("setModerated"),
            sync("setUnmoderated"),
            sync("kick"),
            sync("ban"),
            sync("unban"),
            sync("trade"),
            sync("respondToTrade"),
            sync("cancelTrade"),
            sync("toGC"),
        ],
        events: &[
            "chatInvite",
            "user",
            "relationships",
            "friend",
            "group",
            "friendMsg",
            "chatMsg",
            "chatStateChange",
            "tradeOffers",
            "tradeProposed",
            "tradeResult",
            "sessionStart",
            "announcement",
            "fromGC",
        ],
    },
    GroupSpec {
        group: "trade",
        operations: &[
            sync("getProperty"),
            with_callback("loadInventory", 2),
            with_callback("getContexts", 0),
            with_callback("open", 1),
            with_callback("addItem", 1),
            with_callback("removeItem", 1),
            with_callback("ready", 0),
            with_callback("unready", 0),
            with_callback("confirm", 0),
            with_callback("cancel", 0),
            with_callback("chatMsg", 1),
        ],
        events: &["end", "offerChanged", "ready", "unready", "chatMsg"],
    },
    GroupSpec {
        group: "tradeOffers",
        operations: &[
            with_callback("loadMyInventory", 2),
            with_callback("loadPartnerInventory", 3),
            with_callback("makeOffer", 1),
            with_callback("getOffers", 1),
            with_callback("getOffer", 1),
            with_callback("declineOffer", 1),
            with_callback("acceptOffer", 1),
            with_callback("cancelOffer", 1),
        ],
        events: &[],
    },
];

/// Look a group up by name.
pub fn group(name: &str) -> Option<&'static GroupSpec> {
    REGISTRY.iter().find(|spec| spec.group == name)
}
