use pricing::PricingContext;

#[derive(Clone, Default)]
pub(crate) struct AppState {
    pub(crate) pricing: PricingContext,
}
