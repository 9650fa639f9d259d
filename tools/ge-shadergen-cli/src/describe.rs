//! Describe command - decode a vertex key

use anyhow::Result;
use clap::Args;
use ge_shadergen::{DoLightComputation, TessellationMode, VShaderId, resolve_light_computations};

use crate::args::KeyArgs;

/// Arguments for the describe command
#[derive(Args)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub key: KeyArgs,
}

/// Execute the describe command
pub fn execute(args: DescribeArgs) -> Result<()> {
    let id = args.key.resolve()?;
    print!("{}", describe(id));
    Ok(())
}

fn describe(id: VShaderId) -> String {
    let mut lines = vec![
        format!("Key: {}", id),
        format!("  Raw:               0x{:016x}", id.raw()),
        format!("  Through mode:      {}", id.is_through()),
        format!("  Hardware xform:    {}", id.use_hw_transform()),
        format!("  Vertex color:      {}", id.has_color()),
        format!("  Normal:            {}{}", id.has_normal(), if id.normals_reversed() { " (reversed)" } else { "" }),
        format!("  Texcoord:          {}", id.has_texcoord()),
        format!("  Secondary color:   {}", id.lmode()),
        format!("  Flat shading:      {}", id.flat_shade()),
        format!("  UV generation:     {:?}", id.uv_gen_mode()),
        format!("  Material update:   {:?}", id.material_update()),
    ];
    if id.tessellation() != TessellationMode::None {
        lines.push(format!(
            "  Tessellation:      {:?}{}",
            id.tessellation(),
            if id.has_color_tess() { " with color" } else { "" }
        ));
    }
    lines.push(format!("  Lighting:          {}", id.lighting_enabled()));

    let computations = resolve_light_computations(id);
    for (i, (slot, computation)) in id.lights().iter().zip(computations).enumerate() {
        if computation == DoLightComputation::Off {
            continue;
        }
        lines.push(format!(
            "    Light {}: {:?} {:?} ({:?})",
            i, slot.light_type, slot.computation, computation
        ));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
