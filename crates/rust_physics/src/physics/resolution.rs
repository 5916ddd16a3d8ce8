//! Explicit position correction
//!
//! Nothing separates overlapping bodies automatically. Gameplay code calls
//! [`push_out`] from a collide listener when it wants a solid response.

use super::body::Body;
use super::collision::Collision;
use super::host::HasBody;

/// Move the source of `collision` out of its target
///
/// Skips events that are already resolved, have no overlap, or whose source
/// is static. On success the source is translated by `-displacement`, loses
/// the velocity component pointing into the target, and the pair is marked
/// resolved so the mirrored event is left alone.
pub fn push_out<H: HasBody + ?Sized>(host: &mut H, collision: &Collision) -> bool {
    if collision.is_resolved() || !collision.has_overlap() {
        return false;
    }
    if host.body(collision.source).is_some_and(Body::is_static) {
        return false;
    }
    if !host.translate(collision.source, -collision.displacement()) {
        return false;
    }
    if let Some(body) = host.body_mut(collision.source) {
        let into = body.vel.dot(&collision.normal);
        if into > 0.0 {
            body.vel -= collision.normal * into;
        }
    }
    collision.prevent_resolution();
    true
}
