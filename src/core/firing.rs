use serde::Serialize;

use crate::models::trigger::TriggerNotification;

/// One future firing of a registered trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firing {
    pub trigger_id: String,
    pub at_ms: i64,
    pub title: String,
    pub body: String,
}

fn period_ms(trigger: &TriggerNotification) -> Option<i64> {
    trigger.repeat.period().map(|p| p.num_milliseconds())
}

/// First firing of `trigger` at or after `from_ms`.
pub fn next_fire_at(trigger: &TriggerNotification, from_ms: i64) -> Option<i64> {
    if trigger.timestamp_ms >= from_ms {
        return Some(trigger.timestamp_ms);
    }
    let period = period_ms(trigger)?;
    let behind = from_ms - trigger.timestamp_ms;
    let steps = (behind + period - 1) / period;
    Some(trigger.timestamp_ms + steps * period)
}

/// Every firing in `[from_ms, to_ms)` across all triggers, earliest first.
pub fn upcoming(triggers: &[TriggerNotification], from_ms: i64, to_ms: i64) -> Vec<Firing> {
    let mut firings = Vec::new();
    for trigger in triggers {
        let Some(mut at) = next_fire_at(trigger, from_ms) else {
            continue;
        };
        while at < to_ms {
            firings.push(Firing {
                trigger_id: trigger.id.clone(),
                at_ms: at,
                title: trigger.title.clone(),
                body: trigger.body.clone(),
            });
            match period_ms(trigger) {
                Some(p) => at += p,
                None => break,
            }
        }
    }
    firings.sort_by(|a, b| a.at_ms.cmp(&b.at_ms).then_with(|| a.trigger_id.cmp(&b.trigger_id)));
    firings
}
