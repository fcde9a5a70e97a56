//! The external library allowlist.
//!
//! These names are never resolved from the snapshot. They stay as external
//! references in the bundle and are satisfied at runtime by the deployed
//! page's import map. The set is configuration, fixed at build time, not
//! derived from snapshot content.

/// Libraries excluded from bundling, matched exactly against specifiers.
pub const EXTERNAL_MODULES: &[&str] = &[
    // Core runtime
    "react",
    "react/jsx-runtime",
    "react-dom",
    "react-dom/client",
    // Utilities available without explicit declaration
    "clsx",
    "tailwind-merge",
    // UI & animation
    "framer-motion",
    "lucide-react",
    "lottie-react",
    "canvas-confetti",
    "gsap",
    // State management
    "zustand",
    "zustand/middleware",
    // Data & math
    "date-fns",
    "date-fns/locale",
    "lodash",
    "recharts",
    "mathjs",
    "papaparse",
    "xlsx",
    "axios",
    // 3D & graphics
    "three",
    "@react-three/fiber",
    "@react-three/drei",
    "@react-three/cannon",
    "pixi.js",
    "@pixi/react",
    // Maps
    "leaflet",
    "react-leaflet",
    // Content & media
    "react-markdown",
    "howler",
    "tone",
    "mammoth",
];

/// Whether a specifier names an allowlisted external library.
pub fn is_external(specifier: &str) -> bool {
    EXTERNAL_MODULES.contains(&specifier)
}

/// A JavaScript identifier for the hoisted namespace import of an external.
pub fn binding_name(index: usize) -> String {
    format!("__heron_import_{index}")
}
