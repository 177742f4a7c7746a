//! Provides `Booster` trait.

use crate::error::Result;
use std::ops::ControlFlow;


/// The trait [`Booster`] defines the standard framework of Boosting.
/// Here, the **standard framework** is the following loop:
///
/// In each round `t = 1, 2, ...`,
/// 1. Booster computes the pseudo-residuals
///    of the current model.
/// 2. Every base learner fits the pseudo-residuals,
///    and the booster adds a shrunk copy of the best one to the model.
///
/// # Required Methods
/// - [`Booster::name`]
/// - [`Booster::preprocess`]
/// - [`Booster::boost`]
/// - [`Booster::postprocess`]
/// - [`Booster::info`] ... optional.
///
/// # Provided Methods
/// - [`Booster::run`]
pub trait Booster {
    /// The model output by a boosting algorithm.
    type Output;


    /// Returns the name of the boosting algorithm.
    fn name(&self) -> &str;


    /// Returns the information of boosting algorithm as `String`.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// A main function that runs boosting algorithm.
    /// Configuration errors are reported before the first iteration.
    fn run(&mut self) -> Result<Self::Output> {
        self.preprocess()?;

        let _ = (1..).try_for_each(|iter| self.boost(iter));

        Ok(self.postprocess())
    }


    /// Pre-processing for `self`.
    /// As you can see in [`Booster::run`],
    /// this method is called before the boosting process.
    fn preprocess(&mut self) -> Result<()>;


    /// Boosting step per iteration.
    /// This method returns
    /// `ControlFlow::Continue(())` to go on to the next iteration,
    /// `ControlFlow::Break(terminated_iter)` otherwise.
    fn boost(&mut self, iteration: usize) -> ControlFlow<usize>;


    /// Post-processing.
    fn postprocess(&mut self) -> Self::Output;
}
