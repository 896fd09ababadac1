use daydash_engine::widget::{
  Link,
  QuickLink
};
use web_sys::MouseEvent;
use yew::{
  Callback,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct LinksWidgetProps {
  pub links: Vec<Link>
}

#[function_component(LinksWidget)]
pub fn links_widget(
  props: &LinksWidgetProps
) -> Html {
  html! {
    <ul class="links-list">
      {
        for props.links.iter().map(|link| html! {
          <li>
            <a href={link.url.clone()} target="_blank" rel="noopener">
              { link.label.clone() }
            </a>
          </li>
        })
      }
    </ul>
  }
}

#[derive(Properties, PartialEq)]
pub struct QuickLinksWidgetProps {
  pub links:   Vec<QuickLink>,
  /// Receives the overlay target.
  pub on_open: Callback<String>
}

#[function_component(QuickLinksWidget)]
pub fn quick_links_widget(
  props: &QuickLinksWidgetProps
) -> Html {
  html! {
    <ul class="quick-links">
      {
        for props.links.iter().map(|link| {
          let target = link.target.clone();
          let on_open = props.on_open.clone();
          let onclick = Callback::from(move |event: MouseEvent| {
            event.prevent_default();
            on_open.emit(target.clone());
          });
          html! {
            <li>
              <a href="#" class="open-overlay" data-target={link.target.clone()} {onclick}>
                { link.label.clone() }
              </a>
            </li>
          }
        })
      }
    </ul>
  }
}
