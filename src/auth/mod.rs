pub mod capability;
pub mod gateway;
pub mod jwt;
pub mod middleware;
pub mod session;

pub use capability::{Capability, authorize, has_capability, require_capability, stored_role};
pub use gateway::{AuthGateway, DbAuthGateway, GatewayError, Session, SessionUser};
pub use jwt::JwtUtils;
pub use middleware::{AuthMiddleware, AuthUser, MaybeAuthUser};
pub use session::{SessionProvider, SessionState, TokenSessionProvider};
