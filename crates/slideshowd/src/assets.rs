//! Embedded client assets. The page itself lives in `web::index`; the
//! rotation script is served separately so browsers can cache it.

pub const SLIDESHOW_JS: &str = r#"// Slideshow client: polls the image listing and rotates with a cross-fade.

const ROTATE_MS = 3000;
const RELOAD_MS = 30000;
const TRANSITION_MS = 500;

let images = [];
let layers = [];
let current = 0;
let rotateTimer = null;
let transitioning = false;

function container() {
  return document.getElementById('imageContainer');
}

function listChanged(next) {
  if (next.length !== images.length) return true;
  for (let i = 0; i < next.length; i++) {
    if (next[i] !== images[i]) return true;
  }
  return false;
}

async function refreshImages() {
  let list;
  try {
    const response = await fetch('/api/images');
    if (!response.ok) throw new Error('status ' + response.status);
    list = await response.json();
  } catch (err) {
    console.error('image listing failed:', err);
    showOfflineBadge();
    return;
  }
  hideOfflineBadge();

  if (list.length === 0) {
    images = [];
    layers = [];
    stopRotation();
    container().innerHTML = '';
    showMessage('No images found');
    return;
  }

  if (listChanged(list)) {
    images = list.slice();
    rebuildLayers();
    startRotation();
  }
}

function rebuildLayers() {
  const root = container();
  root.innerHTML = '';
  layers = [];
  current = 0;
  showMessage('Loading images…');

  for (let i = 0; i < images.length; i++) {
    const img = document.createElement('img');
    img.className = 'image-layer';
    img.src = '/images/' + encodeURIComponent(images[i]);
    img.alt = images[i];
    if (i === 0) img.classList.add('active');
    root.appendChild(img);
    layers.push(img);
  }

  const counter = document.createElement('div');
  counter.className = 'image-info';
  root.appendChild(counter);
  updateCounter();

  const first = layers[0];
  if (first.complete) {
    hideMessage();
  } else {
    first.addEventListener('load', hideMessage);
    first.addEventListener('error', hideMessage);
  }
}

function updateCounter() {
  const counter = container().querySelector('.image-info');
  if (counter) counter.textContent = (current + 1) + ' / ' + images.length;
}

function showMessage(text) {
  const root = container();
  let message = root.querySelector('.loading');
  if (!message) {
    message = document.createElement('div');
    message.className = 'loading';
    root.appendChild(message);
  }
  message.textContent = text;
  message.style.display = 'flex';
}

function hideMessage() {
  const message = container().querySelector('.loading');
  if (message) message.style.display = 'none';
}

function showOfflineBadge() {
  if (document.querySelector('.server-offline-badge')) return;
  const badge = document.createElement('div');
  badge.className = 'server-offline-badge';
  badge.textContent = 'Server offline';
  container().appendChild(badge);
}

function hideOfflineBadge() {
  const badge = document.querySelector('.server-offline-badge');
  if (badge) badge.remove();
}

function stopRotation() {
  if (rotateTimer) {
    clearInterval(rotateTimer);
    rotateTimer = null;
  }
}

function startRotation() {
  stopRotation();
  if (layers.length < 2) return;
  rotateTimer = setInterval(() => {
    if (!transitioning) rotate();
  }, ROTATE_MS);
}

function rotate() {
  if (layers.length === 0) return;
  transitioning = true;

  const next = (current + 1) % layers.length;
  layers[current].classList.remove('active');
  layers[next].classList.add('active');

  // Wrapping around is a natural moment to look for manifest changes.
  if (next === 0) {
    setTimeout(refreshImages, 1000);
  }

  current = next;
  updateCounter();
  setTimeout(() => {
    transitioning = false;
  }, TRANSITION_MS);
}

window.addEventListener('load', () => {
  refreshImages();
  setInterval(refreshImages, RELOAD_MS);
});
"#;
