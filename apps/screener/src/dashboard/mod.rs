// Dashboard API: the presentation surface over the orchestrator.
// Handlers only translate HTTP to intents (submit/select/close/cancel) and
// return read-only snapshots; all lifecycle logic lives in `analysis`.

pub mod handlers;
