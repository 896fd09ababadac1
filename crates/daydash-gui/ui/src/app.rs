use std::cell::RefCell;
use std::rc::Rc;

use daydash_engine::feeds::WeatherSummary;
use daydash_engine::host::{
  ExternalFeeds,
  Feed
};
use daydash_engine::timer::TimerPhase;
use daydash_engine::timing::SystemClock;
use daydash_engine::todo::{
  TodoFilter,
  TodoStats,
  TodoTask
};
use daydash_engine::{
  Dashboard,
  DashboardResult,
  Services,
  Store,
  Wakeup,
  Widget,
  WidgetBody,
  WidgetId
};
use gloo::timers::callback::{
  Interval,
  Timeout
};
use web_sys::DragEvent;
use yew::functional::use_force_update;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_state
};

use crate::action::DashboardAction;
use crate::components::{
  AddWidgetModal,
  LinksWidget,
  NoteWidget,
  OverlayPanel,
  QuickLinksWidget,
  ScheduleWidget,
  TimerWidget,
  TodoWidget,
  Toolbar,
  WeatherWidget,
  WidgetFrame
};
use crate::config::{
  UiConfig,
  load_ui_config
};
use crate::host::{
  DialogPrompt,
  FetchFeeds,
  GlooScheduler
};
use crate::storage::BrowserStore;

type SharedDashboard = Rc<
  RefCell<Option<Dashboard<BrowserStore>>>
>;

/// Render-time copy of one widget and
/// its controller state.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
  Static,
  Note {
    text: String
  },
  Todo {
    visible: Vec<TodoTask>,
    filter:  TodoFilter,
    stats:   TodoStats
  },
  Timer {
    display: String,
    phase:   TimerPhase
  }
}

#[derive(Debug, Clone, PartialEq)]
struct WidgetView {
  widget:  Widget,
  content: WidgetContent
}

fn snapshot(
  dashboard: &Dashboard<BrowserStore>
) -> Vec<WidgetView> {
  dashboard
    .widgets()
    .iter()
    .map(|widget| {
      let id = &widget.id;
      let content = if let Ok(note) =
        dashboard.note(id)
      {
        WidgetContent::Note {
          text: note.text().to_string()
        }
      } else if let Ok(todo) =
        dashboard.todo(id)
      {
        WidgetContent::Todo {
          visible: todo
            .visible()
            .into_iter()
            .cloned()
            .collect(),
          filter:  todo.filter(),
          stats:   todo.stats()
        }
      } else if let Ok(timer) =
        dashboard.timer(id)
      {
        WidgetContent::Timer {
          display: timer.display(),
          phase:   timer.phase()
        }
      } else {
        WidgetContent::Static
      };
      WidgetView {
        widget: widget.clone(),
        content
      }
    })
    .collect()
}

/// Delay before a freshly added widget
/// drops its `entering` class and
/// slides into place.
const ENTER_DELAY_MS: u32 = 100;

/// What an action did to the
/// dashboard.
#[derive(Debug, Clone, PartialEq)]
enum Applied {
  Unchanged,
  Changed,
  Added(WidgetId)
}

impl From<bool> for Applied {
  fn from(changed: bool) -> Self {
    if changed {
      Applied::Changed
    } else {
      Applied::Unchanged
    }
  }
}

fn apply<S: Store>(
  dashboard: &mut Dashboard<S>,
  action: DashboardAction
) -> DashboardResult<Applied> {
  let changed = match action {
    | DashboardAction::AddWidget(kind) => {
      let id =
        dashboard.add_widget(kind.tag())?;
      tracing::info!(
        widget = %id,
        kind = kind.tag(),
        "widget added"
      );
      return Ok(Applied::Added(id));
    }
    | DashboardAction::RemoveWidget(
      id
    ) => dashboard.remove_widget(&id),
    | DashboardAction::Reset => {
      Ok(dashboard.reset()?.is_some())
    }
    | DashboardAction::DragStart(id) => {
      Ok(dashboard.begin_drag(&id))
    }
    | DashboardAction::DragOver {
      target,
      pointer_y,
      rect
    } => {
      Ok(dashboard.drag_over(
        pointer_y, &target, rect
      ))
    }
    | DashboardAction::Drop => {
      if dashboard
        .layout()
        .dragging()
        .is_none()
      {
        return Ok(Applied::Unchanged);
      }
      dashboard.drop_dragged()?;
      Ok(true)
    }
    | DashboardAction::DragEnd => {
      dashboard.cancel_drag();
      Ok(true)
    }
    | DashboardAction::NoteEdit(
      id,
      text
    ) => {
      dashboard.note_edit(&id, &text)?;
      Ok(true)
    }
    | DashboardAction::NoteBlur(id) => {
      dashboard.note_blur(&id)?;
      Ok(false)
    }
    | DashboardAction::TodoAdd {
      widget,
      text,
      priority
    } => {
      Ok(
        dashboard
          .todo_add(
            &widget, &text, priority
          )?
          .is_some()
      )
    }
    | DashboardAction::TodoToggle(
      id,
      task
    ) => dashboard.todo_toggle(&id, task),
    | DashboardAction::TodoRemove(
      id,
      task
    ) => dashboard.todo_remove(&id, task),
    | DashboardAction::TodoClearCompleted(
      id
    ) => {
      Ok(
        dashboard
          .todo_clear_completed(&id)?
          > 0
      )
    }
    | DashboardAction::TodoFilter(
      id,
      filter
    ) => {
      dashboard
        .todo_set_filter(&id, filter)?;
      Ok(true)
    }
    | DashboardAction::TimerStart(id) => {
      dashboard.timer_start(&id)
    }
    | DashboardAction::TimerPause(id) => {
      dashboard.timer_pause(&id)
    }
    | DashboardAction::TimerReset(id) => {
      dashboard.timer_reset(&id)?;
      Ok(true)
    }
  }?;
  Ok(Applied::from(changed))
}

/// Runs `f` against the mounted
/// dashboard. The borrow ends before the
/// caller re-renders.
fn with_dashboard<T>(
  shared: &SharedDashboard,
  f: impl FnOnce(
    &mut Dashboard<BrowserStore>
  ) -> DashboardResult<T>
) -> Option<T> {
  let Ok(mut slot) =
    shared.try_borrow_mut()
  else {
    tracing::warn!(
      "dashboard busy; event dropped"
    );
    return None;
  };
  let dashboard = slot.as_mut()?;
  match f(dashboard) {
    | Ok(value) => Some(value),
    | Err(error) => {
      tracing::error!(
        %error,
        "dashboard operation failed"
      );
      None
    }
  }
}

fn render_body(
  view: &WidgetView,
  config: &UiConfig,
  weather: Option<&WeatherSummary>,
  schedule: Option<&Vec<String>>,
  on_action: &Callback<DashboardAction>,
  on_open_overlay: &Callback<String>
) -> Html {
  let id = view.widget.id.clone();
  match (&view.widget.body, &view.content)
  {
    | (
      WidgetBody::Note {
        placeholder
      },
      WidgetContent::Note {
        text
      }
    ) => {
      html! {
        <NoteWidget
          id={id}
          text={text.clone()}
          placeholder={placeholder.clone()}
          on_action={on_action.clone()}
        />
      }
    }
    | (
      _,
      WidgetContent::Todo {
        visible,
        filter,
        stats
      }
    ) => {
      html! {
        <TodoWidget
          id={id}
          tasks={visible.clone()}
          filter={*filter}
          stats={stats.clone()}
          on_action={on_action.clone()}
        />
      }
    }
    | (
      _,
      WidgetContent::Timer {
        display,
        phase
      }
    ) => {
      html! {
        <TimerWidget
          id={id}
          display={display.clone()}
          phase={*phase}
          on_action={on_action.clone()}
        />
      }
    }
    | (WidgetBody::Text(text), _) => {
      html! { <p>{ text.clone() }</p> }
    }
    | (
      WidgetBody::Schedule(defaults),
      _
    ) => {
      let lines = schedule
        .cloned()
        .unwrap_or_else(|| {
          defaults.clone()
        });
      html! {
        <ScheduleWidget lines={lines} />
      }
    }
    | (
      WidgetBody::Weather {
        placeholder
      },
      _
    ) => {
      html! {
        <WeatherWidget
          summary={weather.cloned()}
          placeholder={placeholder.clone()}
          location={config.weather.location.clone()}
        />
      }
    }
    | (WidgetBody::QuickLinks(links), _) => {
      html! {
        <QuickLinksWidget
          links={links.clone()}
          on_open={on_open_overlay.clone()}
        />
      }
    }
    | (WidgetBody::Links(links), _) => {
      html! {
        <LinksWidget links={links.clone()} />
      }
    }
    | (body, content) => {
      tracing::warn!(
        widget = %id,
        ?body,
        ?content,
        "widget has no bound controller"
      );
      html! {}
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let config =
    use_state(load_ui_config);
  let dashboard: SharedDashboard =
    use_mut_ref(|| None);
  let force_update = use_force_update();
  let weather =
    use_state(|| None::<WeatherSummary>);
  let schedule =
    use_state(|| None::<Vec<String>>);
  let open_overlay =
    use_state(|| None::<String>);
  let adding = use_state(|| false);
  let entering =
    use_state(|| None::<WidgetId>);

  let on_wakeup = {
    let dashboard = dashboard.clone();
    let force_update =
      force_update.clone();
    Callback::from(
      move |wakeup: Wakeup| {
        let changed = with_dashboard(
          &dashboard,
          |dashboard| {
            dashboard
              .handle_wakeup(&wakeup)
          }
        );
        if changed == Some(true) {
          force_update.force_update();
        }
      }
    )
  };

  {
    let config = (*config).clone();
    let dashboard = dashboard.clone();
    let force_update =
      force_update.clone();
    let weather_setter = weather.setter();
    let schedule_setter =
      schedule.setter();
    use_effect_with((), move |_| {
      let feeds = Rc::new(
        FetchFeeds::new(
          &config,
          Callback::from(
            move |summary| {
              weather_setter
                .set(Some(summary));
            }
          ),
          Callback::from(move |lines| {
            schedule_setter
              .set(Some(lines));
          })
        )
      );
      let services = Services {
        clock:     Rc::new(SystemClock),
        scheduler: Rc::new(
          GlooScheduler::new(on_wakeup)
        ),
        prompt:    Rc::new(DialogPrompt),
        feeds:     feeds.clone()
      };
      let mut mounted = Dashboard::new(
        BrowserStore::open(),
        config.dashboard.clone(),
        services
      );
      match mounted.load() {
        | Ok(report) => {
          tracing::info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "dashboard restored"
          );
        }
        | Err(error) => {
          tracing::error!(
            %error,
            "failed to restore \
             dashboard"
          );
        }
      }
      *dashboard.borrow_mut() =
        Some(mounted);
      force_update.force_update();

      let refresh = Interval::new(
        config.refresh_millis(),
        move || {
          feeds.refresh(Feed::Weather);
        }
      );
      move || drop(refresh)
    });
  }

  // Restored widgets never pass
  // through here, only ones added from
  // the picker.
  {
    let entering = entering.clone();
    use_effect_with(
      (*entering).clone(),
      move |added| {
        let settle = added.is_some().then(
          || {
            Timeout::new(
              ENTER_DELAY_MS,
              move || entering.set(None)
            )
          }
        );
        move || drop(settle)
      }
    );
  }

  let on_action = {
    let dashboard = dashboard.clone();
    let force_update =
      force_update.clone();
    let entering = entering.clone();
    Callback::from(
      move |action: DashboardAction| {
        tracing::debug!(
          ?action,
          "dashboard action"
        );
        let applied = with_dashboard(
          &dashboard,
          |dashboard| {
            apply(dashboard, action)
          }
        );
        match applied {
          | Some(Applied::Added(id)) => {
            entering.set(Some(id));
            force_update.force_update();
          }
          | Some(Applied::Changed) => {
            force_update.force_update();
          }
          | Some(Applied::Unchanged)
          | None => {}
        }
      }
    )
  };

  let on_open_overlay = {
    let open_overlay =
      open_overlay.clone();
    Callback::from(
      move |target: String| {
        open_overlay.set(Some(target));
      }
    )
  };
  let on_close_overlay = {
    let open_overlay =
      open_overlay.clone();
    Callback::from(move |()| {
      open_overlay.set(None);
    })
  };

  let on_open_add = {
    let adding = adding.clone();
    Callback::from(move |()| {
      adding.set(true);
    })
  };
  let on_close_add = {
    let adding = adding.clone();
    Callback::from(move |()| {
      adding.set(false);
    })
  };
  let on_pick_widget = {
    let adding = adding.clone();
    let on_action = on_action.clone();
    Callback::from(move |kind| {
      adding.set(false);
      on_action.emit(
        DashboardAction::AddWidget(kind)
      );
    })
  };
  let on_reset = {
    let on_action = on_action.clone();
    Callback::from(move |()| {
      on_action
        .emit(DashboardAction::Reset);
    })
  };

  let (views, dragging) = dashboard
    .try_borrow()
    .ok()
    .and_then(|slot| {
      slot.as_ref().map(|dashboard| {
        (
          snapshot(dashboard),
          dashboard
            .layout()
            .dragging()
            .cloned()
        )
      })
    })
    .unwrap_or_default();

  let ondragover =
    Callback::from(|event: DragEvent| {
      event.prevent_default();
    });
  let ondrop = {
    let on_action = on_action.clone();
    Callback::from(
      move |event: DragEvent| {
        event.prevent_default();
        on_action
          .emit(DashboardAction::Drop);
      }
    )
  };

  let overlay = (*open_overlay)
    .as_deref()
    .and_then(|target| {
      config.overlay(target).cloned()
    });

  html! {
    <>
      <Toolbar
        on_add={on_open_add}
        on_reset={on_reset}
      />
      <main id="dashboard" class="dashboard" {ondragover} {ondrop}>
        {
          for views.iter().map(|view| {
            let id: WidgetId = view.widget.id.clone();
            let is_dragging = dragging.as_ref() == Some(&id);
            html! {
              <WidgetFrame
                key={id.to_string()}
                id={id.clone()}
                title={view.widget.title.clone()}
                draggable={view.widget.draggable}
                is_dragging={is_dragging}
                entering={entering.as_ref() == Some(&id)}
                on_action={on_action.clone()}
              >
                {
                  render_body(
                    view,
                    &config,
                    (*weather).as_ref(),
                    (*schedule).as_ref(),
                    &on_action,
                    &on_open_overlay,
                  )
                }
              </WidgetFrame>
            }
          })
        }
      </main>
      {
        if *adding {
          html! {
            <AddWidgetModal
              on_pick={on_pick_widget}
              on_close={on_close_add}
            />
          }
        } else {
          html! {}
        }
      }
      {
        if let Some(overlay) = overlay {
          html! {
            <OverlayPanel
              overlay={overlay}
              on_close={on_close_overlay}
            />
          }
        } else {
          html! {}
        }
      }
    </>
  }
}

#[cfg(test)]
mod tests {
  use daydash_engine::{
    DashboardSettings,
    MemoryStore,
    WidgetKind
  };

  use super::*;

  fn headless() -> Dashboard<MemoryStore> {
    Dashboard::new(
      MemoryStore::new(),
      DashboardSettings::default(),
      Services::headless()
    )
  }

  #[test]
  fn added_widget_is_reported_for_the_entrance() {
    let mut dashboard = headless();
    dashboard.load().expect("load");
    let before = dashboard.widgets().len();

    let applied = apply(
      &mut dashboard,
      DashboardAction::AddWidget(
        WidgetKind::Note
      )
    )
    .expect("add");

    let Applied::Added(id) = applied else {
      panic!("expected an added widget, got {applied:?}");
    };
    assert_eq!(dashboard.widgets().len(), before + 1);
    assert_eq!(
      dashboard.widgets().last().map(|widget| &widget.id),
      Some(&id)
    );
  }

  #[test]
  fn drag_actions_do_not_trigger_the_entrance() {
    let mut dashboard = headless();
    dashboard.load().expect("load");

    let dropped = apply(
      &mut dashboard,
      DashboardAction::Drop
    )
    .expect("drop");
    assert_eq!(dropped, Applied::Unchanged);

    let ended = apply(
      &mut dashboard,
      DashboardAction::DragEnd
    )
    .expect("drag end");
    assert_eq!(ended, Applied::Changed);
  }
}
