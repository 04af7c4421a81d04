//! Model training runs.
//!
//! A run advances one epoch per tick. Accuracy and loss move along a fixed
//! curve while training; the final epoch draws the reported figures.

use rand::Rng;
use tracing::{debug, info};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Cv,
    Nlp,
    Rl,
    Regression,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cv => "cv",
            Self::Nlp => "nlp",
            Self::Rl => "rl",
            Self::Regression => "regression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrainingStatus {
    Idle,
    Training,
    Completed,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Training => "training",
            Self::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRun {
    pub id: String,
    pub name: String,
    pub kind: ModelKind,
    pub status: TrainingStatus,
    pub epoch: u32,
    pub total_epochs: u32,
    pub accuracy: Option<f64>,
    pub loss: Option<f64>,
}

impl TrainingRun {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ModelKind,
        total_epochs: u32,
    ) -> Result<Self, SimError> {
        let id = id.into();
        if total_epochs == 0 {
            return Err(SimError::ZeroEpochs(id));
        }
        Ok(Self {
            id,
            name: name.into(),
            kind,
            status: TrainingStatus::Idle,
            epoch: 0,
            total_epochs,
            accuracy: None,
            loss: None,
        })
    }

    /// Begin (or restart) training from epoch zero.
    pub fn start(&mut self) {
        self.status = TrainingStatus::Training;
        self.epoch = 0;
        self.accuracy = None;
        self.loss = None;
        info!(run = %self.id, epochs = self.total_epochs, "training started");
    }

    /// Stop a run in progress. Progress so far is kept.
    pub fn pause(&mut self) {
        if self.status == TrainingStatus::Training {
            self.status = TrainingStatus::Idle;
            info!(run = %self.id, epoch = self.epoch, "training paused");
        }
    }

    /// Percentage of epochs done, in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.fraction_done() * 100.0
    }

    fn fraction_done(&self) -> f64 {
        f64::from(self.epoch) / f64::from(self.total_epochs)
    }

    /// The built-in models, all idle.
    pub fn catalog() -> Vec<TrainingRun> {
        [
            ("unet-segmentation", "U-Net Flood Segmentation", ModelKind::Cv, 100),
            ("bert-classification", "BERT Message Classifier", ModelKind::Nlp, 10),
            ("dqn-routing", "DQN Route Optimizer", ModelKind::Rl, 1000),
            ("xgboost-resources", "XGBoost Resource Predictor", ModelKind::Regression, 50),
        ]
        .into_iter()
        .filter_map(|(id, name, kind, epochs)| Self::new(id, name, kind, epochs).ok())
        .collect()
    }

    /// Run one epoch. Returns `false` when the run is not training.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.status != TrainingStatus::Training {
            return false;
        }
        self.epoch += 1;

        if self.epoch >= self.total_epochs {
            self.epoch = self.total_epochs;
            self.status = TrainingStatus::Completed;
            self.accuracy = Some(0.85 + rng.gen_range(0.0..1.0) * 0.1);
            self.loss = Some(rng.gen_range(0.0..1.0) * 0.5);
            info!(
                run = %self.id,
                accuracy = self.accuracy,
                loss = self.loss,
                "training completed"
            );
        } else {
            let p = self.fraction_done();
            self.accuracy = Some((0.5 + p * 0.4).min(0.9));
            self.loss = Some((2.0 - p * 1.5).max(0.1));
            debug!(run = %self.id, epoch = self.epoch, "epoch done");
        }
        true
    }
}
