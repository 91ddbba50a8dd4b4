//! Wire formats shared with the quiz backend.

mod forms;
mod messages;

pub use forms::{EditableForm, RegistrationForm, SignInForm, ValidationError};
pub use messages::{
    extract_error_message, extract_user_id, AnswerRequest, AnswerResponse, ApiMessage,
    SignInResponse, FALLBACK_ERROR_MESSAGE,
};
