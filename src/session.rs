pub const ACCESS_GRANTED: &str = "access_granted";
