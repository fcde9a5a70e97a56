//! Synthesized project configuration for ephemeral workspaces.
//!
//! Snapshots never ship their own `tsconfig.json`; the checker writes one
//! with strict type checking, bundler-style module resolution, JSX-aware
//! parsing, and permissive unused-symbol rules so diagnostics report real
//! type errors rather than style warnings.

use serde_json::{Value, json};

/// Build the compiler configuration written into every workspace.
pub fn synthesize() -> Value {
    json!({
        "compilerOptions": compiler_options(),
        "include": ["**/*"],
    })
}

fn compiler_options() -> Value {
    json!({
        "strict": true,
        "noEmit": true,
        "target": "ES2020",
        "module": "ESNext",
        "moduleResolution": "bundler",
        "jsx": "react-jsx",
        "lib": ["ES2020", "DOM", "DOM.Iterable"],
        "skipLibCheck": true,
        "allowJs": true,
        "esModuleInterop": true,
        "isolatedModules": true,
        "resolveJsonModule": true,
        // Unused symbols are common in generated code and are not type errors.
        "noUnusedLocals": false,
        "noUnusedParameters": false,
    })
}
