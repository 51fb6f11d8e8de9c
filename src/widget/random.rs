use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::WidgetError;
use crate::feed::Article;

pub fn pick_random<'a, R: Rng + ?Sized>(
    articles: &'a [Article],
    rng: &mut R,
) -> Result<&'a Article, WidgetError> {
    articles.choose(rng).ok_or(WidgetError::EmptyFeed)
}
