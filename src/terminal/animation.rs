//! Particle animations played while a secret burns.

use super::Console;
use crate::viewer::{AnimationGuard, AnimationTrigger, DestructionAnimation, animation::ANIMATION_HOLD};
use clap::builder::styling::{AnsiColor, Effects, Style};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{f64::consts::TAU, io::Write, time::Duration};
use tracing::debug;

pub const FIRE_PARTICLES: usize = 30;
pub const EXPLODE_PARTICLES: usize = 100;

const FIELD_WIDTH: usize = 40;
const FIELD_HEIGHT: usize = 10;
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

const FIRE_GLYPHS: [char; 5] = ['(', ')', '^', '*', '\''];
const EXPLODE_GLYPHS: [char; 5] = ['*', '+', 'x', 'o', '.'];

#[derive(Clone, Copy, Debug)]
struct Particle {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    glyph: char,
}

/// A set of particles moving on a small character grid.
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: usize,
    height: usize,
}

#[allow(clippy::cast_precision_loss)]
impl ParticleField {
    /// Flames rising from the bottom row.
    pub fn fire(rng: &mut impl Rng, width: usize, height: usize) -> Self {
        let particles = (0..FIRE_PARTICLES)
            .map(|_| Particle {
                x: rng.gen_range(0.0..width as f64),
                y: (height - 1) as f64,
                vx: rng.gen_range(-0.3..0.3),
                vy: -rng.gen_range(0.3..1.0),
                glyph: FIRE_GLYPHS[rng.gen_range(0..FIRE_GLYPHS.len())],
            })
            .collect();
        Self {
            particles,
            width,
            height,
        }
    }

    /// Debris flying outwards from the center.
    pub fn explode(rng: &mut impl Rng, width: usize, height: usize) -> Self {
        let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
        let particles = (0..EXPLODE_PARTICLES)
            .map(|_| {
                let angle = rng.gen_range(0.0..TAU);
                let speed = rng.gen_range(0.2..1.2);
                Particle {
                    x: cx,
                    y: cy,
                    // Terminal cells are roughly twice as tall as wide.
                    vx: angle.cos() * speed * 2.0,
                    vy: angle.sin() * speed,
                    glyph: EXPLODE_GLYPHS[rng.gen_range(0..EXPLODE_GLYPHS.len())],
                }
            })
            .collect();
        Self {
            particles,
            width,
            height,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;
        }
    }

    fn cell(&self, particle: &Particle) -> Option<(usize, usize)> {
        let (x, y) = (particle.x.floor(), particle.y.floor());
        if x < 0.0 || y < 0.0 || x >= self.width as f64 || y >= self.height as f64 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cell = (x as usize, y as usize);
        Some(cell)
    }

    /// Particles still inside the grid.
    #[must_use]
    pub fn visible(&self) -> usize {
        self.particles
            .iter()
            .filter(|particle| self.cell(particle).is_some())
            .count()
    }

    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut grid = vec![vec![' '; self.width]; self.height];
        for particle in &self.particles {
            if let Some((x, y)) = self.cell(particle) {
                grid[y][x] = particle.glyph;
            }
        }
        grid.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

/// [`AnimationTrigger`] drawing particle frames on the console for the hold
/// period.
#[derive(Clone)]
pub struct TerminalAnimation {
    console: Console,
    hold: Duration,
    frame: Duration,
    seed: Option<u64>,
}

impl TerminalAnimation {
    #[must_use]
    pub fn new(console: Console) -> Self {
        Self {
            console,
            hold: ANIMATION_HOLD,
            frame: FRAME_INTERVAL,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }

    /// Fixes the particle layout, for reproducible output.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn field(&self, kind: DestructionAnimation) -> Option<(ParticleField, Style)> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        match kind {
            DestructionAnimation::None => None,
            DestructionAnimation::Fire => Some((
                ParticleField::fire(&mut rng, FIELD_WIDTH, FIELD_HEIGHT),
                AnsiColor::Red.on_default() | Effects::BOLD,
            )),
            DestructionAnimation::Explode => Some((
                ParticleField::explode(&mut rng, FIELD_WIDTH, FIELD_HEIGHT),
                AnsiColor::Yellow.on_default() | Effects::BOLD,
            )),
        }
    }
}

impl AnimationTrigger for TerminalAnimation {
    fn play(&self, kind: DestructionAnimation) -> AnimationGuard {
        let Some((mut field, style)) = self.field(kind) else {
            return AnimationGuard::idle();
        };
        debug!(animation = %kind, particles = field.len(), "playing destruction animation");

        let console = self.console.clone();
        let frames = (self.hold.as_millis() / self.frame.as_millis().max(1)).max(1);
        let frame = self.frame;
        let height = field.height;

        AnimationGuard::from_task(tokio::spawn(async move {
            let redraw = console.is_color();
            for index in 0..frames {
                let lines: Vec<String> = field
                    .render()
                    .iter()
                    .map(|line| console.paint(style, line))
                    .collect();
                console.write(|out| {
                    if index > 0 {
                        write!(out, "\x1b[{height}A")?;
                    }
                    for line in &lines {
                        writeln!(out, "{line}")?;
                    }
                    Ok(())
                });
                // Without cursor control a single frame is all we can show.
                if !redraw || field.visible() == 0 {
                    break;
                }
                field.step();
                tokio::time::sleep(frame).await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::testing::{buffer_console, contents};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn fire_and_explode_particle_counts() {
        assert_eq!(ParticleField::fire(&mut rng(), 40, 10).len(), FIRE_PARTICLES);
        assert_eq!(
            ParticleField::explode(&mut rng(), 40, 10).len(),
            EXPLODE_PARTICLES
        );
    }

    #[test]
    fn fire_starts_on_the_bottom_row_and_rises() {
        let mut field = ParticleField::fire(&mut rng(), 40, 10);
        let rows = field.render();
        assert_eq!(rows.len(), 10);
        assert!(rows[..9].iter().all(|row| row.trim().is_empty()));
        assert!(!rows[9].trim().is_empty());

        field.step();
        field.step();
        assert!(field.particles.iter().all(|p| p.y < 9.0));
    }

    #[test]
    fn explosion_spreads_until_out_of_view() {
        let mut field = ParticleField::explode(&mut rng(), 40, 10);
        assert_eq!(field.visible(), EXPLODE_PARTICLES);
        for _ in 0..200 {
            field.step();
        }
        assert_eq!(field.visible(), 0);
    }

    #[test]
    fn render_keeps_grid_width() {
        let field = ParticleField::explode(&mut rng(), 12, 4);
        let rows = field.render();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| row.chars().count() == 12));
    }

    #[tokio::test(start_paused = true)]
    async fn none_draws_nothing() {
        let (console, buffer) = buffer_console();
        let animation = TerminalAnimation::new(console).with_seed(1);
        let guard = animation.play(DestructionAnimation::None);
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(guard);
        assert!(contents(&buffer).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fire_draws_a_frame() {
        let (console, buffer) = buffer_console();
        let animation = TerminalAnimation::new(console)
            .with_hold(Duration::from_millis(400))
            .with_seed(1);
        let guard = animation.play(DestructionAnimation::Fire);
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(guard);

        let output = contents(&buffer);
        assert_eq!(output.lines().count(), FIELD_HEIGHT);
        assert!(output.chars().any(|c| FIRE_GLYPHS.contains(&c)));
    }
}
