pub const VAPI_API_KEY: &str = "VAPI_API_KEY";

pub const BASE_URL: &str = "wss://realtime.vapi.ai";
pub const CALL_PATH: &str = "/call/web";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
