//! Boundary between the engine and an external renderer.

use reanim_types::math::{Color, Matrix2D};

/// One composited track, ready for texture lookup and submission.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
	/// Logical image name or resolved bitmap path
	pub image_ref: String,
	/// World x position
	pub x: f32,
	/// World y position
	pub y: f32,
	/// Effective horizontal scale
	pub scale_x: f32,
	/// Effective vertical scale
	pub scale_y: f32,
	/// Rotation in degrees
	pub rotation: f32,
	/// Effective opacity in `[0, 1]`
	pub alpha: f32,
	/// `false` for poses that are reported but must not be drawn
	pub visible: bool,
	/// Tint multiplied over the image
	pub color: Color,
}

impl DrawCommand {
	/// Builds a command from a world matrix.
	pub fn from_world(image_ref: &str, world: &Matrix2D, alpha: f32, color: Color, visible: bool) -> Self {
		let parts = world.decompose();
		Self {
			image_ref: image_ref.to_string(),
			x: parts.x,
			y: parts.y,
			scale_x: parts.scale_x,
			scale_y: parts.scale_y,
			rotation: parts.rotation(),
			alpha: alpha.clamp(0.0, 1.0),
			visible,
			color,
		}
	}
}

/// Receives the draw commands of one render pass.
///
/// The engine only emits commands for visible tracks with an image; texture
/// lookup, batching and submission belong to the implementor.
pub trait RenderSink {
	/// Consumes one command.
	fn draw(&mut self, command: DrawCommand);
}

impl RenderSink for Vec<DrawCommand> {
	fn draw(&mut self, command: DrawCommand) {
		self.push(command);
	}
}

/// Sink that only counts commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountingSink(pub usize);

impl RenderSink for CountingSink {
	fn draw(&mut self, _command: DrawCommand) {
		self.0 += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_world_decomposes() {
		let world = Matrix2D::from_offset(5.0, 6.0, 2.0, 90.0);
		let cmd = DrawCommand::from_world("IMG", &world, 1.5, Color::WHITE, true);
		assert_eq!((cmd.x, cmd.y), (5.0, 6.0));
		assert!((cmd.scale_x - 2.0).abs() < 1e-5);
		assert!((cmd.rotation - 90.0).abs() < 1e-4);
		assert_eq!(cmd.alpha, 1.0);
	}

	#[test]
	fn test_sinks() {
		let mut list = Vec::new();
		let mut count = CountingSink::default();
		let cmd = DrawCommand::from_world("a", &Matrix2D::IDENTITY, 1.0, Color::WHITE, true);
		list.draw(cmd.clone());
		count.draw(cmd);
		assert_eq!(list.len(), 1);
		assert_eq!(count.0, 1);
	}
}
