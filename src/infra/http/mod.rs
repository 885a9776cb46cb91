mod middleware;
mod public;
mod response;

pub use middleware::RequestContext;
pub use public::{HttpState, build_router};
pub use response::{ResponseAssembler, ResponseOutcome};
