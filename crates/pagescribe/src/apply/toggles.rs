//! Named boolean toggles the applier knows how to find.

/// A boolean record field and the label of the switch that controls it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleSpec {
    /// Top-level record key.
    pub key: &'static str,
    /// Text of the label next to the switch.
    pub label: &'static str,
}

const fn toggle(key: &'static str, label: &'static str) -> ToggleSpec {
    ToggleSpec { key, label }
}

/// Every toggle in apply order. `useVix` comes before the VIX ceiling input
/// is written so the input is enabled by then.
pub const TOGGLES: &[ToggleSpec] = &[
    toggle("useExactDte", "Use Exact DTE"),
    toggle("useVix", "Use VIX"),
    toggle("capProfits", "Cap Profits"),
    toggle("capLosses", "Cap Losses"),
    toggle("useFloatingEntryTime", "Floating Entry Time"),
    toggle("useEarlyExit", "Early Exit"),
    toggle("useBlackoutDays", "Blackout Days"),
    toggle("useGapFilter", "Use Gap"),
    toggle("useIntradayMovement", "Intraday Movement"),
    toggle("useOpeningMovement", "Opening Movement"),
    toggle("useMinMaxEntryPremium", "Min/Max Entry Premium"),
    toggle("useRsi", "Use RSI"),
    toggle("useSma", "Use SMA"),
    toggle("useEma", "Use EMA"),
    toggle("useTrailingStop", "Trailing Stop"),
    toggle("useProfitActions", "Profit Actions"),
    toggle("useStopLossActions", "Stop Loss Actions"),
    toggle("reEnterAfterExit", "Re-Enter"),
    toggle("useDelayedEntry", "Delayed Entry"),
    toggle("ignoreWidths", "Ignore Widths"),
    toggle("closeOpenTradesOnCompletion", "Close Open Trades"),
    toggle("pruneOldestTrades", "Prune Oldest Trades"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_and_labels_unique() {
        let keys: HashSet<_> = TOGGLES.iter().map(|t| t.key).collect();
        let labels: HashSet<_> = TOGGLES.iter().map(|t| t.label).collect();
        assert_eq!(keys.len(), TOGGLES.len());
        assert_eq!(labels.len(), TOGGLES.len());
    }
}
