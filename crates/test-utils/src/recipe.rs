//! Recipe / ingredient fixture: each recipe needs the ingredients produced by
//! other recipes and takes `cook_time` to cook.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use topotask::TaskFunc;

#[derive(Debug, Clone, Default)]
pub struct Recipe {
    pub id: u32,
    pub ingredients: Vec<u32>,
    pub cook_time: Duration,
    pub is_bad: bool,
}

impl Recipe {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn needs(mut self, ingredients: &[u32]) -> Self {
        self.ingredients.extend_from_slice(ingredients);
        self
    }

    pub fn cook_time(mut self, cook_time: Duration) -> Self {
        self.cook_time = cook_time;
        self
    }

    pub fn bad(mut self) -> Self {
        self.is_bad = true;
        self
    }

    pub fn identifier(&self) -> u32 {
        self.id
    }

    pub fn edges(&self) -> Vec<u32> {
        self.ingredients.clone()
    }

    /// Cook the recipe.
    ///
    /// Fails with [`BadRecipe`] for bad recipes, with a plain error if the
    /// inputs do not line up with `ingredients`, and with [`Interrupted`] if
    /// the token fires before `cook_time` elapses.
    pub async fn cook(
        self,
        token: CancellationToken,
        inputs: Vec<Ingredient>,
    ) -> anyhow::Result<Ingredient> {
        if self.is_bad {
            return Err(BadRecipe { id: self.id }.into());
        }
        for (i, requirement) in self.ingredients.iter().enumerate() {
            match inputs.get(i) {
                Some(input) if input.recipe_id == *requirement => {}
                _ => anyhow::bail!("missing requirement {requirement}: got {inputs:?}"),
            }
        }
        tokio::select! {
            _ = token.cancelled() => Err(Interrupted { id: self.id }.into()),
            _ = tokio::time::sleep(self.cook_time) => Ok(Ingredient {
                recipe_id: self.id,
                done: true,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingredient {
    pub recipe_id: u32,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadRecipe {
    pub id: u32,
}

impl fmt::Display for BadRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bad recipe {}", self.id)
    }
}

impl std::error::Error for BadRecipe {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted {
    pub id: u32,
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "recipe {} interrupted", self.id)
    }
}

impl std::error::Error for Interrupted {}

/// Records every task invocation: the recipe and the recipe ids of its inputs.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(u32, Vec<u32>)>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: u32, inputs: &[Ingredient]) {
        let ids = inputs.iter().map(|i| i.recipe_id).collect();
        self.calls.lock().unwrap().push((id, ids));
    }

    /// Recipe ids in invocation order.
    pub fn called(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn was_called(&self, id: u32) -> bool {
        self.calls.lock().unwrap().iter().any(|(c, _)| *c == id)
    }

    /// Input recipe ids the task for `id` received.
    pub fn inputs_of(&self, id: u32) -> Option<Vec<u32>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == id)
            .map(|(_, inputs)| inputs.clone())
    }
}

/// [`Recipe::cook`] that logs each call first.
pub fn recording_cook(log: CallLog) -> impl TaskFunc<Recipe, Ingredient> {
    move |recipe: Recipe, token: CancellationToken, inputs: Vec<Ingredient>| {
        log.record(recipe.id, &inputs);
        recipe.cook(token, inputs)
    }
}
