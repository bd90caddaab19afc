/// Messaging primitives shared by the router, the window and the wizard
///
/// Two shapes of delivery are provided:
/// - **Listeners**: synchronous callbacks registered with `on`/`off`; a
///   handler may veto the event (router guards) or answer it (unload prompts)
/// - **EventBus**: bounded per-subscriber queues of [`WizardEvent`]s, for UI
///   layers that poll between frames
///
/// ## Architecture
///
/// ```text
/// ┌────────┐  hashChangeStart/Complete  ┌───────────┐   WizardEvent   ┌───────────┐
/// │ Router │ ─────────────────────────> │  Wizard   │ ──────────────> │ Event Bus │
/// │        │        (Listeners)         │           │                 │           │
/// └────────┘                            └───────────┘                 └───────────┘
///                                                                           │
///                                                                           ▼
///                                                                     ┌──────────┐
///                                                                     │ UI layer │
///                                                                     └──────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let rx = wizard.events().subscribe();
///
/// while let Ok(event) = rx.try_recv() {
///     match event {
///         WizardEvent::StepEntered { step_id, .. } => { /* update breadcrumbs */ }
///         _ => {}
///     }
/// }
/// ```

pub mod bus;
pub mod events;
pub mod listeners;

// Re-export commonly used types
pub use bus::{EventBus, DEFAULT_QUEUE_CAPACITY};
pub use events::WizardEvent;
pub use listeners::{ListenerId, Listeners};
