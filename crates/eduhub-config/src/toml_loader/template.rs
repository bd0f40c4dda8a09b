//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# EduHub client configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://localhost:8080/api/v1"   # EDUHUB_API_URL overrides this
# connect_timeout_secs = 10
# login_route = "/login"

[session]
# cache_file = "/path/to/identity.json"       # defaults to the platform data dir

[messages]
# poll_interval_ms = 2000

[logging]
# level = "eduhub=info"
"##
    .to_string()
}
