//! Static description of every body in the scene.
//!
//! Sizes and distances are scene units. Speeds are radians per frame at
//! time scale 1. Colours are packed 0xRRGGBB.

/// 0 = Sun, 1..=9 = Mercury..Pluto. Used on the wire and for fact lookups.
pub type BodyIndex = usize;

pub const SUN: BodyIndex = 0;
pub const BODY_COUNT: usize = 10;

// ── Sun ──────────────────────────────────────────────────────────────

pub const SUN_NAME: &str = "Sun";
pub const SUN_RADIUS: f32 = 16.0;
pub const SUN_COLOR: u32 = 0xFFDD44;
pub const SUN_EMISSIVE: f32 = 3.5;
pub const SUN_SPIN: f32 = 0.004;
pub const SUN_GLOW_RADIUS: f32 = 20.0;
pub const SUN_GLOW_COLOR: u32 = 0xFFFF00;
pub const SUN_GLOW_OPACITY: f32 = 0.3;
/// Glow scale = 1 + sin(elapsed · rate) · amplitude.
pub const SUN_PULSE_RATE: f64 = 0.001;
pub const SUN_PULSE_AMPLITUDE: f32 = 0.05;
pub const SUN_LABEL_HEIGHT: f32 = 20.0;

// ── Lights ───────────────────────────────────────────────────────────

pub const AMBIENT_COLOR: u32 = 0x222222;
pub const SUN_LIGHT: (u32, f32, f32) = (0xFFFFFF, 50_000.0, 500.0);
/// Gold fill light, lifted slightly above the sun.
pub const SUN_FILL_LIGHT: (u32, f32, f32) = (0xFFD700, 30_000.0, 400.0);
pub const SUN_FILL_HEIGHT: f32 = 10.0;

// ── Descriptors ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonDesc {
    pub size: f32,
    /// Distance from the planet centre, in the planet's local units.
    pub distance: f32,
    pub speed: f32,
    pub color: u32,
}

pub const MOON_EMISSIVE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingDesc {
    pub inner: f32,
    pub outer: f32,
    /// Rotation about the planet's local Z after laying the ring flat.
    pub tilt: f32,
    pub color: u32,
    pub opacity: f32,
    /// Adds a faint halo band around the main band.
    pub glow: bool,
}

pub const GLOW_RING_PAD: f32 = 0.5;
pub const GLOW_RING_COLOR: u32 = 0xFFFFCC;
pub const GLOW_RING_OPACITY: f32 = 0.2;

impl RingDesc {
    /// Radial extent including the halo band.
    pub fn extent(&self) -> (f32, f32) {
        if self.glow {
            (self.inner - GLOW_RING_PAD, self.outer + GLOW_RING_PAD)
        } else {
            (self.inner, self.outer)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereDesc {
    pub color: u32,
    pub opacity: f32,
}

/// Atmosphere shells sit just outside the surface.
pub const ATMOSPHERE_SCALE: f32 = 1.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetDesc {
    pub name: &'static str,
    pub size: f32,
    pub orbit_radius: f32,
    pub spin_speed: f32,
    pub orbit_speed: f32,
    pub color: u32,
    pub shininess: f32,
    pub orbit_color: u32,
    /// Scale applied when "realistic scale" is on.
    pub realistic_scale: f32,
    pub ring: Option<RingDesc>,
    pub atmosphere: Option<AtmosphereDesc>,
    pub moons: &'static [MoonDesc],
}

impl PlanetDesc {
    /// Label anchor above the planet centre, in local units.
    pub fn label_height(&self) -> f32 {
        self.size + 5.0
    }
}

// ── Station ──────────────────────────────────────────────────────────

/// The station orbits the planet with this name.
pub const STATION_HOST: &str = "Earth";
pub const STATION_OFFSET: f32 = 12.0;
pub const STATION_SCALE: f32 = 0.3;
pub const STATION_SPIN: f32 = 0.01;
pub const STATION_HULL_RADIUS: f32 = 0.5;
pub const STATION_HULL_LENGTH: f32 = 2.0;
pub const STATION_HULL_COLOR: u32 = 0xCCCCCC;
/// Panels are 3 × 0.1 × 1 boxes, approximated by capsules along X.
pub const STATION_PANEL_LENGTH: f32 = 3.0;
pub const STATION_PANEL_RADIUS: f32 = 0.5;
pub const STATION_PANEL_OFFSET: f32 = 2.0;
pub const STATION_PANEL_COLOR: u32 = 0x000088;

// ── Planet table ─────────────────────────────────────────────────────

const fn moon(size: f32, distance: f32, speed: f32, color: u32) -> MoonDesc {
    MoonDesc { size, distance, speed, color }
}

pub static PLANETS: [PlanetDesc; 9] = [
    PlanetDesc {
        name: "Mercury",
        size: 3.2,
        orbit_radius: 28.0,
        spin_speed: 0.004,
        orbit_speed: 0.04,
        color: 0x9A9590,
        shininess: 5.0,
        orbit_color: 0x888888,
        realistic_scale: 0.38,
        ring: None,
        atmosphere: None,
        moons: &[],
    },
    PlanetDesc {
        name: "Venus",
        size: 5.8,
        orbit_radius: 44.0,
        spin_speed: 0.002,
        orbit_speed: 0.015,
        color: 0xE8C27A,
        shininess: 5.0,
        orbit_color: 0xFFA500,
        realistic_scale: 0.95,
        ring: None,
        atmosphere: Some(AtmosphereDesc { color: 0xFFAA00, opacity: 0.2 }),
        moons: &[],
    },
    PlanetDesc {
        name: "Earth",
        size: 6.0,
        orbit_radius: 62.0,
        spin_speed: 0.01,
        orbit_speed: 0.01,
        color: 0x2E6FD8,
        shininess: 10.0,
        orbit_color: 0x0080FF,
        realistic_scale: 1.0,
        ring: None,
        atmosphere: Some(AtmosphereDesc { color: 0x0088FF, opacity: 0.2 }),
        moons: &[moon(1.5, 10.0, 0.05, 0xCCCCCC)],
    },
    PlanetDesc {
        name: "Mars",
        size: 4.0,
        orbit_radius: 78.0,
        spin_speed: 0.018,
        orbit_speed: 0.008,
        color: 0xC1440E,
        shininess: 5.0,
        orbit_color: 0xFF4500,
        realistic_scale: 0.53,
        ring: None,
        atmosphere: None,
        moons: &[
            moon(0.5, 8.0, 0.08, 0xAAAAAA),
            moon(0.3, 12.0, 0.05, 0x888888),
        ],
    },
    PlanetDesc {
        name: "Jupiter",
        size: 12.0,
        orbit_radius: 100.0,
        spin_speed: 0.04,
        orbit_speed: 0.002,
        color: 0xD8A878,
        shininess: 5.0,
        orbit_color: 0xFFD700,
        realistic_scale: 11.2,
        ring: None,
        atmosphere: None,
        moons: &[
            moon(1.8, 20.0, 0.1, 0xFFFF99),
            moon(1.5, 25.0, 0.08, 0xCCCCCC),
            moon(2.0, 30.0, 0.06, 0xFFCC99),
            moon(1.2, 35.0, 0.04, 0xCCCCFF),
        ],
    },
    PlanetDesc {
        name: "Saturn",
        size: 10.0,
        orbit_radius: 138.0,
        spin_speed: 0.038,
        orbit_speed: 0.0009,
        color: 0xE3CB8F,
        shininess: 5.0,
        orbit_color: 0xF4A460,
        realistic_scale: 9.45,
        ring: Some(RingDesc {
            inner: 14.0,
            outer: 28.0,
            tilt: 0.4,
            color: 0xD8C69A,
            opacity: 0.8,
            glow: true,
        }),
        atmosphere: None,
        moons: &[
            moon(2.0, 30.0, 0.09, 0xFFFFCC),
            moon(0.8, 35.0, 0.07, 0xCCCCCC),
        ],
    },
    PlanetDesc {
        name: "Uranus",
        size: 7.0,
        orbit_radius: 176.0,
        spin_speed: 0.03,
        orbit_speed: 0.0004,
        color: 0x9FD8E0,
        shininess: 5.0,
        orbit_color: 0x40E0D0,
        realistic_scale: 4.01,
        ring: Some(RingDesc {
            inner: 10.0,
            outer: 15.0,
            tilt: 0.15,
            color: 0xA8D0D8,
            opacity: 0.6,
            glow: false,
        }),
        atmosphere: None,
        moons: &[moon(1.0, 18.0, 0.06, 0xCCFFFF)],
    },
    PlanetDesc {
        name: "Neptune",
        size: 7.0,
        orbit_radius: 200.0,
        spin_speed: 0.032,
        orbit_speed: 0.0001,
        color: 0x3E66D0,
        shininess: 5.0,
        orbit_color: 0x4169E1,
        realistic_scale: 3.88,
        ring: None,
        atmosphere: None,
        moons: &[moon(1.2, 18.0, 0.08, 0x9999FF)],
    },
    PlanetDesc {
        name: "Pluto",
        size: 2.8,
        orbit_radius: 216.0,
        spin_speed: 0.008,
        orbit_speed: 0.00007,
        color: 0xC8B39A,
        shininess: 5.0,
        orbit_color: 0xDDA0DD,
        realistic_scale: 0.19,
        ring: None,
        atmosphere: None,
        moons: &[moon(0.8, 8.0, 0.1, 0xCCCCCC)],
    },
];

/// Planet descriptor for a body index (`None` for the Sun or out of range).
pub fn planet(index: BodyIndex) -> Option<&'static PlanetDesc> {
    index.checked_sub(1).and_then(|i| PLANETS.get(i))
}

pub fn body_name(index: BodyIndex) -> Option<&'static str> {
    if index == SUN {
        Some(SUN_NAME)
    } else {
        planet(index).map(|p| p.name)
    }
}

pub fn body_index(name: &str) -> Option<BodyIndex> {
    if name == SUN_NAME {
        return Some(SUN);
    }
    PLANETS.iter().position(|p| p.name == name).map(|i| i + 1)
}

/// Decode a body index sent as a float. Rejects fractions, negatives and out-of-range values.
pub fn body_from_wire(value: f32) -> Option<BodyIndex> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    let index = value as usize;
    (index < BODY_COUNT).then_some(index)
}

/// Anchor height for a body's label, before the body's scale.
pub fn label_height(index: BodyIndex) -> f32 {
    planet(index).map_or(SUN_LABEL_HEIGHT, PlanetDesc::label_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for i in 0..BODY_COUNT {
            let name = body_name(i).unwrap();
            assert_eq!(body_index(name), Some(i));
        }
        assert_eq!(body_name(BODY_COUNT), None);
        assert_eq!(body_index("Vulcan"), None);
    }

    #[test]
    fn orbits_grow_outward() {
        for pair in PLANETS.windows(2) {
            assert!(pair[0].orbit_radius < pair[1].orbit_radius, "{}", pair[1].name);
        }
    }

    #[test]
    fn moon_counts_match_scene() {
        let counts: Vec<usize> = PLANETS.iter().map(|p| p.moons.len()).collect();
        assert_eq!(counts, vec![0, 0, 1, 2, 4, 2, 1, 1, 1]);
    }

    #[test]
    fn only_saturn_has_a_glow_ring() {
        let saturn = planet(body_index("Saturn").unwrap()).unwrap();
        let ring = saturn.ring.unwrap();
        assert!(ring.glow);
        assert_eq!(ring.extent(), (13.5, 28.5));

        let uranus = planet(body_index("Uranus").unwrap()).unwrap().ring.unwrap();
        assert!(!uranus.glow);
        assert_eq!(uranus.extent(), (10.0, 15.0));
    }

    #[test]
    fn wire_index_validation() {
        assert_eq!(body_from_wire(0.0), Some(SUN));
        assert_eq!(body_from_wire(9.0), Some(9));
        assert_eq!(body_from_wire(10.0), None);
        assert_eq!(body_from_wire(-1.0), None);
        assert_eq!(body_from_wire(2.5), None);
        assert_eq!(body_from_wire(f32::NAN), None);
    }

    #[test]
    fn label_heights() {
        assert_eq!(label_height(SUN), 20.0);
        assert_eq!(label_height(3), 11.0);
    }
}
