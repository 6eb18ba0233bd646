// Model-backed analyses served through the gateway.
// Each analysis kind owns its prompt and its validator; the gateway owns everything else.

pub mod ats;
pub mod handlers;
pub mod interview;
pub mod prompts;
pub mod schema;
