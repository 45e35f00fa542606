//! Ray kind flags.

bitflags! {
    /// Classifies how a ray came to exist. The flags compose: a ray spawned
    /// by a null-scattering event keeps its previous kind and gains
    /// `SINGULAR`, and instance visibility masks are matched against the
    /// whole bitfield.
    pub struct RayFlags: u8 {
        const CAMERA       = 1 << 0;
        const REFLECTION   = 1 << 1;
        const TRANSMISSION = 1 << 2;
        const SHADOW       = 1 << 3;
        const VOLUME       = 1 << 4;
        const DIFFUSE      = 1 << 5;
        const GLOSSY       = 1 << 6;
        const SINGULAR     = 1 << 7;
    }
}

impl Default for RayFlags {
    fn default() -> Self {
        RayFlags::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_composes_with_previous_kind() {
        let prev = RayFlags::TRANSMISSION | RayFlags::GLOSSY;
        let flags = prev | RayFlags::SINGULAR;
        assert!(flags.contains(RayFlags::TRANSMISSION));
        assert!(flags.contains(RayFlags::SINGULAR));
    }
}
