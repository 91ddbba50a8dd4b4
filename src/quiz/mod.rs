//! Quiz progression: question queue, persisted countdown and the session
//! state machine that ties them together.

mod clock;
mod queue;
mod session;
mod store;
mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use queue::QuestionQueue;
pub use session::{
    submit_answer, ModalKind, Phase, QuizSession, ResultModal, SessionEvent, SessionHost,
    SubmitRejected, SubmitTicket, MODAL_SECONDS,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use timer::{TimerPersistence, TimerRecord, QUESTION_SECONDS, TIMER_KEY};
