//! The closed set of calls the service answers, tagged with their shape.
//!
//! tonic routes each call by its method path onto the generated
//! `UserService` trait; this enum names the same calls so logs and metrics
//! can label them without passing strings around.

/// How request and response messages flow for a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallShape {
    /// One request, one response.
    Unary,
    /// One request, a stream of responses.
    ServerStreaming,
    /// A stream of requests, one response.
    ClientStreaming,
    /// Independent request and response streams.
    Bidirectional,
}

impl CallShape {
    pub const fn as_str(self) -> &'static str {
        match self {
            CallShape::Unary => "unary",
            CallShape::ServerStreaming => "server_streaming",
            CallShape::ClientStreaming => "client_streaming",
            CallShape::Bidirectional => "bidirectional",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
    CreateUser,
    GetUser,
    UpdateUser,
    DeleteUser,
    ListUsers,
    CreateMultipleUsers,
    ChatWithUsers,
}

impl Call {
    /// The gRPC method name, as it appears in the request path.
    pub const fn name(self) -> &'static str {
        match self {
            Call::CreateUser => "CreateUser",
            Call::GetUser => "GetUser",
            Call::UpdateUser => "UpdateUser",
            Call::DeleteUser => "DeleteUser",
            Call::ListUsers => "ListUsers",
            Call::CreateMultipleUsers => "CreateMultipleUsers",
            Call::ChatWithUsers => "ChatWithUsers",
        }
    }

    pub const fn shape(self) -> CallShape {
        match self {
            Call::CreateUser | Call::GetUser | Call::UpdateUser | Call::DeleteUser => {
                CallShape::Unary
            }
            Call::ListUsers => CallShape::ServerStreaming,
            Call::CreateMultipleUsers => CallShape::ClientStreaming,
            Call::ChatWithUsers => CallShape::Bidirectional,
        }
    }

    pub const fn is_streaming(self) -> bool {
        !matches!(self.shape(), CallShape::Unary)
    }
}
