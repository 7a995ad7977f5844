use rand::seq::SliceRandom;
use rand::Rng;
use std::time::SystemTime;

const BANNERS: [&str; 4] = ["NEW RECORD!", "HIGH SCORE!", "UNSTOPPABLE!", "ON FIRE!"];
const SYMBOLS: [char; 6] = ['*', '+', 'o', '^', '~', '#'];

/// Particle for the record-break animation
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
    pub is_text: bool,
    pub target_x: f64,
    pub target_y: f64,
}

impl Particle {
    fn burst(x: f64, y: f64, rng: &mut impl Rng) -> Self {
        Self {
            x,
            y,
            vel_x: rng.gen_range(-3.0..3.0),
            vel_y: rng.gen_range(-4.0..-1.0),
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(2.0..4.0),
            is_text: false,
            target_x: x,
            target_y: y,
        }
    }

    fn banner_char(
        x: f64,
        y: f64,
        target_x: f64,
        target_y: f64,
        symbol: char,
        color_index: usize,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            x,
            y,
            vel_x: target_x - x,
            vel_y: target_y - y,
            symbol,
            color_index,
            age: 0.0,
            max_age: rng.gen_range(3.0..5.0),
            is_text: true,
            target_x,
            target_y,
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        if self.is_text {
            let dist = ((self.target_x - self.x).powi(2) + (self.target_y - self.y).powi(2)).sqrt();
            if dist > 1.0 {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_x *= 0.95;
                self.vel_y *= 0.95;
            } else {
                self.x = self.target_x;
                self.y = self.target_y;
                self.vel_x = 0.0;
                self.vel_y = 0.0;
            }
        } else {
            self.x += self.vel_x * dt;
            self.y += self.vel_y * dt;
            self.vel_y += 15.0 * dt;
        }

        self.age += dt;
        self.age < self.max_age
    }
}

/// Animation fired when a session beats the stored high score.
#[derive(Debug)]
pub struct RecordCelebration {
    pub particles: Vec<Particle>,
    pub is_active: bool,
    pub terminal_width: f64,
    pub terminal_height: f64,
    start_time: SystemTime,
    last_update: SystemTime,
    duration: f64,
}

impl RecordCelebration {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            is_active: false,
            terminal_width: 80.0,
            terminal_height: 24.0,
            start_time: SystemTime::now(),
            last_update: SystemTime::now(),
            duration: 3.0,
        }
    }

    pub fn start(&mut self, width: u16, height: u16) {
        let mut rng = rand::thread_rng();

        self.particles.clear();
        self.start_time = SystemTime::now();
        self.last_update = self.start_time;
        self.is_active = true;
        self.terminal_width = width as f64;
        self.terminal_height = height as f64;

        let center_x = width as f64 / 2.0;
        let center_y = height as f64 / 2.0;

        for _ in 0..40 {
            let x = rng.gen_range(0.0..width.max(1) as f64);
            self.particles.push(Particle::burst(x, center_y, &mut rng));
        }

        let banner = BANNERS.choose(&mut rng).unwrap_or(&BANNERS[0]);
        let start_x = center_x - banner.len() as f64 / 2.0;
        for (i, symbol) in banner.chars().enumerate() {
            if symbol == ' ' {
                continue;
            }
            let target_x = start_x + i as f64;
            let origin_x = rng.gen_range(0.0..width.max(1) as f64);
            let origin_y = rng.gen_range(0.0..height.max(1) as f64);
            self.particles.push(Particle::banner_char(
                origin_x,
                origin_y,
                target_x,
                center_y - 4.0,
                symbol,
                i % 7,
                &mut rng,
            ));
        }
    }

    pub fn update(&mut self) {
        if !self.is_active {
            return;
        }

        let now = SystemTime::now();
        let dt = now
            .duration_since(self.last_update)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
            .min(0.25);
        self.last_update = now;

        self.particles.retain_mut(|p| p.update(dt));

        let elapsed = self
            .start_time
            .elapsed()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        if elapsed > self.duration || self.particles.is_empty() {
            self.is_active = false;
            self.particles.clear();
        }
    }
}

impl Default for RecordCelebration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive_and_empty() {
        let celebration = RecordCelebration::new();
        assert!(!celebration.is_active);
        assert!(celebration.particles.is_empty());
    }

    #[test]
    fn start_spawns_burst_and_banner() {
        let mut celebration = RecordCelebration::new();
        celebration.start(80, 24);

        assert!(celebration.is_active);
        assert!(celebration.particles.len() > 40);
        assert!(celebration.particles.iter().any(|p| p.is_text));
        assert!(celebration.particles.iter().any(|p| !p.is_text));
    }

    #[test]
    fn update_is_a_noop_when_inactive() {
        let mut celebration = RecordCelebration::new();
        celebration.update();
        assert!(!celebration.is_active);
    }

    #[test]
    fn particles_age_out() {
        let mut particle = Particle::burst(10.0, 10.0, &mut rand::thread_rng());
        particle.max_age = 0.5;
        assert!(particle.update(0.2));
        assert!(!particle.update(0.4));
    }

    #[test]
    fn banner_chars_settle_on_target() {
        let mut rng = rand::thread_rng();
        let mut particle = Particle::banner_char(0.0, 0.0, 10.0, 5.0, 'R', 0, &mut rng);
        for _ in 0..400 {
            particle.age = 0.0; // keep it alive; only motion is under test
            particle.update(0.05);
        }
        assert!((particle.x - 10.0).abs() <= 1.5);
        assert!((particle.y - 5.0).abs() <= 1.5);
    }
}
