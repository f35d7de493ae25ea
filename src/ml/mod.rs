// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly except the data
// layer's Dataset/Batcher implementations it feeds.
//
// What's in this layer:
//
//   model.rs     — The convolutional regression network:
//                  • three strided/pooled conv blocks (16/32/64)
//                  • three ReLU dense layers (100/50/10)
//                  • dropout after every dense stage
//                  • a single linear output: the steering angle
//
//   trainer.rs   — The training driver
//                  Walks the data directories in order, handles
//                  forward pass, MSE loss, backward pass, Adam
//                  step, per-epoch validation, test evaluation,
//                  and snapshot saving
//
//   predictor.rs — The inference engine
//                  Loads the snapshot, decodes one camera frame,
//                  runs the model, returns the predicted angle
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional steering-angle regression model
pub mod model;

/// Training driver: fit, evaluate, snapshot across directories
pub mod trainer;

/// Inference engine — loads the snapshot and predicts angles
pub mod predictor;
