//! Collision detection and response
//!
//! Circle-vs-box geometry shared by live balls and the aim preview, so the
//! preview bends exactly where the real ball will.

use glam::Vec2;

use super::state::Paddle;
use crate::consts::*;

/// Axis a box contact is resolved on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Result of a circle-vs-box check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectHit {
    /// Axis with the smaller overlap; only this velocity component reflects
    pub axis: Axis,
    /// Overlap depth on that axis
    pub penetration: f32,
}

/// Closest-point test between a circle and an axis-aligned box.
///
/// Degenerate shapes (non-positive radius or box extent) never collide.
pub fn circle_rect_collision(center: Vec2, radius: f32, min: Vec2, size: Vec2) -> Option<RectHit> {
    if radius <= 0.0 || size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let max = min + size;
    let closest = center.clamp(min, max);
    if (center - closest).length_squared() >= radius * radius {
        return None;
    }

    let overlap_x = (center.x + radius - min.x).min(max.x - (center.x - radius));
    let overlap_y = (center.y + radius - min.y).min(max.y - (center.y - radius));

    Some(if overlap_x < overlap_y {
        RectHit {
            axis: Axis::X,
            penetration: overlap_x,
        }
    } else {
        RectHit {
            axis: Axis::Y,
            penetration: overlap_y,
        }
    })
}

/// Bounce a circle off a box: reflect one velocity axis away from the box
/// and push the circle clear of it. Returns true on contact.
pub fn bounce_off_rect(pos: &mut Vec2, vel: &mut Vec2, radius: f32, min: Vec2, size: Vec2) -> bool {
    let Some(hit) = circle_rect_collision(*pos, radius, min, size) else {
        return false;
    };
    let center = min + size * 0.5;
    match hit.axis {
        Axis::X => {
            if pos.x < center.x {
                pos.x = min.x - radius;
                vel.x = -vel.x.abs();
            } else {
                pos.x = min.x + size.x + radius;
                vel.x = vel.x.abs();
            }
        }
        Axis::Y => {
            if pos.y < center.y {
                pos.y = min.y - radius;
                vel.y = -vel.y.abs();
            } else {
                pos.y = min.y + size.y + radius;
                vel.y = vel.y.abs();
            }
        }
    }
    true
}

/// Side and top walls. The bottom is open. Positions are clamped into the
/// arena; returns true if a velocity component was reflected.
pub fn bounce_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, width: f32) -> bool {
    let mut bounced = false;

    if pos.x - radius < 0.0 {
        pos.x = radius;
        if vel.x < 0.0 {
            vel.x = -vel.x;
            bounced = true;
        }
    } else if pos.x + radius > width {
        pos.x = width - radius;
        if vel.x > 0.0 {
            vel.x = -vel.x;
            bounced = true;
        }
    }

    if pos.y - radius < 0.0 {
        pos.y = radius;
        if vel.y < 0.0 {
            vel.y = -vel.y;
            bounced = true;
        }
    }

    bounced
}

/// Falling ball has reached the base line
#[inline]
pub fn crossed_base_line(pos: Vec2, vel: Vec2) -> bool {
    vel.y > 0.0 && pos.y >= BASE_LINE_Y
}

/// Ball has left the arena entirely (or its state went non-finite)
#[inline]
pub fn out_of_bounds(pos: Vec2, radius: f32) -> bool {
    !pos.is_finite() || pos.y - radius > ARENA_HEIGHT
}

/// Deflect a falling ball off the paddle.
///
/// The outgoing angle depends on where the ball lands: the normalized hit
/// offset `(x - left) / width - 0.5` scales the horizontal share of the
/// speed, so edge hits leave at a sharper angle than center hits. Speed is
/// preserved.
pub fn deflect_off_paddle(
    pos: &mut Vec2,
    vel: &mut Vec2,
    radius: f32,
    paddle: &Paddle,
    deflection: f32,
) -> bool {
    if vel.y <= 0.0 || paddle.width <= 0.0 {
        return false;
    }
    let in_band = pos.y + radius >= PADDLE_Y && pos.y - radius <= PADDLE_Y + PADDLE_HEIGHT;
    let left = paddle.left();
    let in_extent = pos.x >= left && pos.x <= left + paddle.width;
    if !in_band || !in_extent {
        return false;
    }

    let offset = (pos.x - left) / paddle.width - 0.5;
    let speed = vel.length();
    let vx = offset * 2.0 * deflection * speed;
    let vy = -(speed * speed - vx * vx).max(0.0).sqrt();
    *vel = Vec2::new(vx, vy);
    pos.y = PADDLE_Y - radius;
    true
}
