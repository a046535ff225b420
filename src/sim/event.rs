/// Events emitted during a simulation step.
/// The presentation layer consumes these for text and sound cues.

use crate::domain::entity::ObjectId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    InteractionAvailable { id: ObjectId },
    InteractionLost { id: ObjectId },
    DialogOpened { id: ObjectId },
    DialogClosed { id: ObjectId },
    HotbarSelected { slot: usize },
}
