//! Entity identifier generation.
//!
//! Identifiers are opaque strings of the form `{prefix}_{millis}_{suffix}`,
//! where the prefix names the entity kind (`user`, `policy`, `claim`,
//! `call`). The suffix is a random fragment drawn from a v4 UUID, so
//! collisions are extremely unlikely but not impossible; ids are
//! timestamp-led yet NOT strictly monotonic under clock skew or rapid
//! calls. Good enough for this domain.

use chrono::Utc;
use uuid::Uuid;

/// Create a new identifier for the given entity-kind prefix.
pub fn create_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &random[..8])
}
