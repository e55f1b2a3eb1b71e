pub struct Icons;

impl Icons {
    pub const ROCKET: &str = "🚀";
    pub const CHECK: &str = "✅";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const EMPTY: &str = "∅";
    pub const KEY: &str = "🔑";
    pub const LINK: &str = "🔗";
}
