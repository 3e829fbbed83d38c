// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, or evaluating a trained head).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// The explicit post-training evaluation workflow
pub mod evaluate_use_case;
